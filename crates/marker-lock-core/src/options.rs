//! Timing options for lock acquisition.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{LockError, LockResult};

/// Markers older than this are considered abandoned.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(60);

/// How long `acquire` keeps retrying a fresh lock.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(2);

/// Lower bound of one backoff sleep.
pub const DEFAULT_BACKOFF_MIN: Duration = Duration::from_millis(500);

/// Upper bound of one backoff sleep.
pub const DEFAULT_BACKOFF_MAX: Duration = Duration::from_millis(1500);

/// Timing knobs for the acquire loop.
///
/// Deserializes from fractional-second keys, any of which may be omitted:
///
/// ```toml
/// stale_after_secs = 60
/// max_wait_secs = 2
/// backoff_min_secs = 0.5
/// backoff_max_secs = 1.5
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LockOptions {
    /// Age past which an existing marker may be hijacked.
    #[serde(rename = "stale_after_secs", with = "secs")]
    pub stale_after: Duration,
    /// Total backoff budget before giving up.
    #[serde(rename = "max_wait_secs", with = "secs")]
    pub max_wait: Duration,
    #[serde(rename = "backoff_min_secs", with = "secs")]
    pub backoff_min: Duration,
    #[serde(rename = "backoff_max_secs", with = "secs")]
    pub backoff_max: Duration,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            stale_after: DEFAULT_STALE_AFTER,
            max_wait: DEFAULT_MAX_WAIT,
            backoff_min: DEFAULT_BACKOFF_MIN,
            backoff_max: DEFAULT_BACKOFF_MAX,
        }
    }
}

impl LockOptions {
    /// Checks that the backoff range is usable.
    ///
    /// # Errors
    ///
    /// Returns `LockError::InvalidOptions` if `backoff_max` is zero or
    /// smaller than `backoff_min`.
    pub fn validate(&self) -> LockResult<()> {
        if self.backoff_max.is_zero() {
            return Err(LockError::InvalidOptions(
                "backoff_max must be greater than zero".to_string(),
            ));
        }
        if self.backoff_min > self.backoff_max {
            return Err(LockError::InvalidOptions(format!(
                "backoff_min ({:?}) exceeds backoff_max ({:?})",
                self.backoff_min, self.backoff_max
            )));
        }
        Ok(())
    }
}

/// Durations as fractional seconds.
mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, de::Error};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(value).map_err(D::Error::custom)
    }
}
