//! Marker lock provider implementation.

use std::path::Path;
use std::time::Duration;

use marker_lock_core::error::LockResult;
use marker_lock_core::options::LockOptions;
use marker_lock_core::traits::LockProvider;

use crate::lock::MarkerLock;

/// Builder for marker lock provider configuration.
#[derive(Debug, Clone, Default)]
pub struct MarkerLockProviderBuilder {
    options: LockOptions,
}

impl MarkerLockProviderBuilder {
    /// Creates a new builder with default timings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all timings at once, e.g. with options read from a config file.
    pub fn options(mut self, options: LockOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the age past which a lock is considered abandoned.
    pub fn stale_after(mut self, stale_after: Duration) -> Self {
        self.options.stale_after = stale_after;
        self
    }

    /// Sets how long `acquire` waits for a held lock by default.
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.options.max_wait = max_wait;
        self
    }

    /// Sets the bounds of one randomized retry delay.
    pub fn backoff(mut self, min: Duration, max: Duration) -> Self {
        self.options.backoff_min = min;
        self.options.backoff_max = max;
        self
    }

    /// Builds the provider.
    ///
    /// # Errors
    ///
    /// Returns `LockError::InvalidOptions` if the backoff range is unusable.
    pub fn build(self) -> LockResult<MarkerLockProvider> {
        self.options.validate()?;
        Ok(MarkerLockProvider {
            options: self.options,
        })
    }
}

/// Provider for marker-based advisory locks.
///
/// Holds only configuration. Locks created from any number of providers, in
/// any number of processes, coordinate through the markers on disk.
#[derive(Debug, Clone)]
pub struct MarkerLockProvider {
    options: LockOptions,
}

impl MarkerLockProvider {
    /// Returns a new builder for configuring the provider.
    pub fn builder() -> MarkerLockProviderBuilder {
        MarkerLockProviderBuilder::new()
    }

    /// Creates a provider with the given timings.
    ///
    /// Convenience method for simple use cases.
    pub fn new(options: LockOptions) -> LockResult<Self> {
        Self::builder().options(options).build()
    }

    /// Returns the timings applied to every lock.
    pub fn options(&self) -> &LockOptions {
        &self.options
    }
}

impl LockProvider for MarkerLockProvider {
    type Lock = MarkerLock;

    fn create_lock(&self, resource: &Path) -> LockResult<Self::Lock> {
        MarkerLock::from_path(resource, self.options)
    }
}
