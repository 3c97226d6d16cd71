//! Structured results of the lock operations.
//!
//! These are plain records: a transport layer serializes them as-is.

use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::error::LockError;

/// Result of an acquire attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcquireOutcome {
    /// Whether the caller now holds the lock.
    pub acquired: bool,
    /// Time spent since the first attempt, zero on an uncontended acquire.
    #[serde(rename = "waited_seconds", serialize_with = "tenths")]
    pub waited: Duration,
    /// Empty on success, otherwise why the lock was not obtained.
    pub detail: String,
    /// The lock was obtained by replacing a stale marker.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hijacked: bool,
}

impl AcquireOutcome {
    pub fn acquired(waited: Duration, hijacked: bool) -> Self {
        Self {
            acquired: true,
            waited,
            detail: String::new(),
            hijacked,
        }
    }

    pub fn failed(waited: Duration, error: &LockError) -> Self {
        Self {
            acquired: false,
            waited,
            detail: error.to_string(),
            hijacked: false,
        }
    }

    /// Wait time in seconds rounded to one decimal.
    pub fn waited_seconds(&self) -> f64 {
        round_tenths(self.waited)
    }
}

/// Result of a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseOutcome {
    pub released: bool,
    pub detail: String,
}

impl ReleaseOutcome {
    pub fn released() -> Self {
        Self {
            released: true,
            detail: String::new(),
        }
    }

    pub fn failed(error: &LockError) -> Self {
        Self {
            released: false,
            detail: error.to_string(),
        }
    }
}

/// Result of a status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockStatus {
    pub locked: bool,
}

/// Any of the three outcomes, for callers dispatching on an action word.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LockReply {
    Acquire(AcquireOutcome),
    Release(ReleaseOutcome),
    Status(LockStatus),
}

impl LockReply {
    /// Whether the resource is held by the caller or someone else after the
    /// operation, as far as this reply can tell.
    pub fn locked(&self) -> bool {
        match self {
            LockReply::Acquire(outcome) => outcome.acquired,
            LockReply::Release(_) => false,
            LockReply::Status(status) => status.locked,
        }
    }

    /// Failure detail, empty when the operation succeeded.
    pub fn detail(&self) -> &str {
        match self {
            LockReply::Acquire(outcome) => &outcome.detail,
            LockReply::Release(outcome) => &outcome.detail,
            LockReply::Status(_) => "",
        }
    }
}

fn round_tenths(duration: Duration) -> f64 {
    (duration.as_secs_f64() * 10.0).round() / 10.0
}

fn tenths<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(round_tenths(*duration))
}
