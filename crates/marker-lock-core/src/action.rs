//! Action words selecting a lock operation.

use std::fmt;
use std::str::FromStr;

use crate::error::LockError;

/// The three operations a caller can request on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockAction {
    Lock,
    Unlock,
    Status,
}

impl LockAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockAction::Lock => "lock",
            LockAction::Unlock => "unlock",
            LockAction::Status => "status",
        }
    }
}

impl FromStr for LockAction {
    type Err = LockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lock" => Ok(LockAction::Lock),
            "unlock" => Ok(LockAction::Unlock),
            "status" => Ok(LockAction::Status),
            _ => Err(LockError::UnknownAction(s.to_string())),
        }
    }
}

impl fmt::Display for LockAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
