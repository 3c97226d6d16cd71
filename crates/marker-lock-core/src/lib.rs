//! Core traits and types for filesystem advisory locks.

pub mod action;
pub mod error;
pub mod options;
pub mod outcome;
pub mod prelude;
pub mod traits;

pub use error::{LockError, LockResult};
pub use prelude::*;
