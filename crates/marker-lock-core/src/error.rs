//! Error types for advisory lock operations.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during lock operations.
///
/// Operations on a built lock never surface these as `Err`; the terminal
/// error is rendered into the outcome's `detail` instead. `Err` is only
/// returned while constructing a lock (bad path, bad options, bad action).
#[derive(Error, Debug)]
pub enum LockError {
    /// Gave up waiting for a fresh lock held by someone else.
    #[error("cannot get lock for {name} after {:.1} sec wait", .waited.as_secs_f64())]
    Timeout { name: String, waited: Duration },

    /// The lock is held and the caller asked not to wait.
    #[error("lock already exists for {name}")]
    AlreadyLocked { name: String },

    /// The delete-then-create sequence replacing a stale marker failed.
    #[error("cannot hijack stale lock for {name}: {source}")]
    HijackFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The existing marker could not be inspected.
    #[error("error on existing lock on {name}: {source}")]
    Inspect {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The marker could not be created or removed.
    #[error("lock marker '{}' failed: {source}", .path.display())]
    Marker {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Release was requested but no marker exists.
    #[error("no lock exists for {name}")]
    NotLocked { name: String },

    /// The resource path cannot carry a lock marker.
    #[error("invalid resource path: {0}")]
    InvalidResource(String),

    /// Lock options are inconsistent.
    #[error("invalid lock options: {0}")]
    InvalidOptions(String),

    /// An action word other than `lock`, `unlock` or `status`.
    #[error(
        "unknown action '{0}': set action=lock to lock, action=unlock to unlock, action=status to get lock status"
    )]
    UnknownAction(String),
}

/// Result type for lock operations.
pub type LockResult<T> = Result<T, LockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_rounds_to_tenths() {
        let err = LockError::Timeout {
            name: "report.csv".to_string(),
            waited: Duration::from_millis(2049),
        };
        assert_eq!(
            err.to_string(),
            "cannot get lock for report.csv after 2.0 sec wait"
        );
    }

    #[test]
    fn test_hijack_message_carries_source() {
        let err = LockError::HijackFailed {
            name: "a.txt".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("cannot hijack stale lock for a.txt"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
