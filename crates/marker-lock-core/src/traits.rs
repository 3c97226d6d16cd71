//! Core traits for advisory locks.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use crate::action::LockAction;
use crate::error::{LockError, LockResult};
use crate::outcome::{AcquireOutcome, LockReply, LockStatus, ReleaseOutcome};

// ============================================================================
// Advisory Lock Trait
// ============================================================================

/// An advisory exclusive lock on one resource.
///
/// The lock holds no state between calls: every operation consults the
/// backing store, so any number of `AdvisoryLock` values (in any number of
/// processes) for the same resource cooperate. Nothing ties a release to the
/// caller that acquired; holders are expected to release what they took.
///
/// # Example
///
/// ```rust,ignore
/// let outcome = lock.acquire(Some(Duration::from_secs(5))).await;
/// if outcome.acquired {
///     rewrite_resource().await?;
///     lock.release().await;
/// }
/// ```
pub trait AdvisoryLock: Send + Sync {
    /// Returns a short name for the resource, used in details and logs.
    fn name(&self) -> &str;

    /// Returns the path of the locked resource.
    fn resource(&self) -> &Path;

    /// Acquires the lock, retrying with jittered backoff for up to `max_wait`.
    ///
    /// `None` uses the configured wait budget. Stale locks are taken over.
    /// Never fails: a lock that could not be obtained is reported through
    /// `AcquireOutcome::acquired` and `AcquireOutcome::detail`.
    ///
    /// # Cancellation
    ///
    /// Dropping the returned future between retries leaves no marker behind.
    fn acquire(
        &self,
        max_wait: Option<Duration>,
    ) -> impl Future<Output = AcquireOutcome> + Send;

    /// Makes a single acquisition attempt without sleeping.
    ///
    /// Stale locks are still taken over.
    fn try_acquire(&self) -> impl Future<Output = AcquireOutcome> + Send;

    /// Removes the lock regardless of who took it.
    fn release(&self) -> impl Future<Output = ReleaseOutcome> + Send;

    /// Reports whether the resource is currently locked.
    ///
    /// Does not block and does not change anything.
    fn status(&self) -> LockStatus;
}

// ============================================================================
// Provider Traits
// ============================================================================

/// Factory for advisory locks on resource paths.
///
/// Providers carry the backend configuration, so request handlers only
/// deal in resolved paths.
///
/// # Example
///
/// ```rust,ignore
/// let provider = MarkerLockProvider::builder()
///     .stale_after(Duration::from_secs(60))
///     .build()?;
///
/// let lock = provider.create_lock(Path::new("/srv/data/report.csv"))?;
/// let outcome = lock.acquire(None).await;
/// ```
pub trait LockProvider: Send + Sync {
    /// The lock type created by this provider.
    type Lock: AdvisoryLock;

    /// Creates a lock for the resource at `resource`.
    ///
    /// # Errors
    ///
    /// Returns `LockError::InvalidResource` if the path cannot carry a lock.
    fn create_lock(&self, resource: &Path) -> LockResult<Self::Lock>;
}

// ============================================================================
// Convenience Extensions
// ============================================================================

/// Extension trait providing one-call operations on a provider.
pub trait LockProviderExt: LockProvider {
    /// Acquires the lock on `resource`.
    fn acquire_resource(
        &self,
        resource: &Path,
        max_wait: Option<Duration>,
    ) -> impl Future<Output = LockResult<AcquireOutcome>> + Send
    where
        Self: Sync,
    {
        let lock = self.create_lock(resource);
        async move { Ok::<_, LockError>(lock?.acquire(max_wait).await) }
    }

    /// Releases the lock on `resource`.
    fn release_resource(
        &self,
        resource: &Path,
    ) -> impl Future<Output = LockResult<ReleaseOutcome>> + Send
    where
        Self: Sync,
    {
        let lock = self.create_lock(resource);
        async move { Ok::<_, LockError>(lock?.release().await) }
    }

    /// Reports the lock status of `resource`.
    fn resource_status(&self, resource: &Path) -> LockResult<LockStatus> {
        Ok(self.create_lock(resource)?.status())
    }

    /// Runs the operation named by `action` on `resource`.
    fn perform(
        &self,
        resource: &Path,
        action: LockAction,
    ) -> impl Future<Output = LockResult<LockReply>> + Send
    where
        Self: Sync,
    {
        let lock = self.create_lock(resource);
        async move {
            let lock = lock?;
            let reply = match action {
                LockAction::Lock => LockReply::Acquire(lock.acquire(None).await),
                LockAction::Unlock => LockReply::Release(lock.release().await),
                LockAction::Status => LockReply::Status(lock.status()),
            };
            Ok::<_, LockError>(reply)
        }
    }
}

// Blanket implementation for all LockProviders
impl<T: LockProvider> LockProviderExt for T {}
