//! Advisory locks on shared files, coordinated purely through the filesystem.
//!
//! A resource is locked while a marker `<resource>.lock` exists next to it.
//! Callers in any number of processes (or machines sharing the storage)
//! cooperate without a lock service: creating the marker is the atomic
//! step, held locks are retried with randomized backoff, and markers left
//! behind by crashed holders are taken over once they are older than a
//! staleness threshold.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use marker_lock::*;
//! use std::path::Path;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = MarkerLockProvider::builder()
//!         .stale_after(Duration::from_secs(60))
//!         .max_wait(Duration::from_secs(2))
//!         .build()?;
//!
//!     // The path comes already resolved and validated from the caller.
//!     let lock = provider.create_lock(Path::new("/srv/shared/report.csv"))?;
//!
//!     let outcome = lock.acquire(None).await;
//!     if outcome.acquired {
//!         println!("locked after {} sec", outcome.waited_seconds());
//!         lock.release().await;
//!     } else {
//!         println!("not locked: {}", outcome.detail);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Guarantees
//!
//! - At most one concurrent `acquire` of a free resource succeeds.
//! - `release` is unconditional: the lock is advisory and carries no owner.
//! - `status` only checks for the marker and never changes anything.
//! - Waiters poll; there is no fairness among them and no wakeup on release.
//! - Taking over a stale marker is a delete followed by a create. A loser of
//!   that race keeps waiting instead of reporting success.
//!
//! # Crate Organization
//!
//! This is a meta-crate that re-exports types from:
//! - `marker-lock-core`: Traits, options, outcome records, errors
//! - `marker-lock-file`: The filesystem marker backend

// Re-export core types and traits
pub use marker_lock_core::*;

// Re-export file backend
pub use marker_lock_file::*;
