//! In-memory provider for testing code written against the lock traits.

use marker_lock_core::error::{LockError, LockResult};
use marker_lock_core::outcome::{AcquireOutcome, LockStatus, ReleaseOutcome};
use marker_lock_core::traits::{AdvisoryLock, LockProvider};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock lock sharing a set of held resources with its provider.
pub struct MockAdvisoryLock {
    resource: PathBuf,
    name: String,
    held: Arc<Mutex<HashSet<PathBuf>>>,
}

impl MockAdvisoryLock {
    fn try_take(&self) -> bool {
        self.held.lock().unwrap().insert(self.resource.clone())
    }
}

impl AdvisoryLock for MockAdvisoryLock {
    fn name(&self) -> &str {
        &self.name
    }

    fn resource(&self) -> &Path {
        &self.resource
    }

    async fn acquire(&self, max_wait: Option<Duration>) -> AcquireOutcome {
        if self.try_take() {
            return AcquireOutcome::acquired(Duration::ZERO, false);
        }
        let waited = max_wait.unwrap_or(Duration::ZERO);
        tokio::time::sleep(waited).await;
        if self.try_take() {
            AcquireOutcome::acquired(waited, false)
        } else {
            AcquireOutcome::failed(
                waited,
                &LockError::Timeout {
                    name: self.name.clone(),
                    waited,
                },
            )
        }
    }

    async fn try_acquire(&self) -> AcquireOutcome {
        if self.try_take() {
            AcquireOutcome::acquired(Duration::ZERO, false)
        } else {
            AcquireOutcome::failed(
                Duration::ZERO,
                &LockError::AlreadyLocked {
                    name: self.name.clone(),
                },
            )
        }
    }

    async fn release(&self) -> ReleaseOutcome {
        if self.held.lock().unwrap().remove(&self.resource) {
            ReleaseOutcome::released()
        } else {
            ReleaseOutcome::failed(&LockError::NotLocked {
                name: self.name.clone(),
            })
        }
    }

    fn status(&self) -> LockStatus {
        LockStatus {
            locked: self.held.lock().unwrap().contains(&self.resource),
        }
    }
}

/// Mock provider for testing provider abstraction.
#[derive(Default)]
pub struct MockLockProvider {
    held: Arc<Mutex<HashSet<PathBuf>>>,
}

impl MockLockProvider {
    /// Creates a new mock provider.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LockProvider for MockLockProvider {
    type Lock = MockAdvisoryLock;

    fn create_lock(&self, resource: &Path) -> LockResult<Self::Lock> {
        if !resource.is_absolute() {
            return Err(LockError::InvalidResource(format!(
                "'{}' is not absolute",
                resource.display()
            )));
        }
        let name = resource
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(MockAdvisoryLock {
            resource: resource.to_path_buf(),
            name,
            held: self.held.clone(),
        })
    }
}
