//! Filesystem backend for advisory locks.
//!
//! A resource is locked while `<resource>.lock` exists. Acquiring creates
//! that marker atomically, waits with jittered backoff while it is held, and
//! takes over markers older than the configured staleness threshold.

mod backoff;
pub mod lock;
pub mod marker;
pub mod provider;

pub use lock::MarkerLock;
pub use marker::{MARKER_EXTENSION, marker_path};
pub use provider::{MarkerLockProvider, MarkerLockProviderBuilder};
