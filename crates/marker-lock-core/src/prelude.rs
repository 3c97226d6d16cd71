//! Convenience prelude for advisory lock types.

pub use crate::action::LockAction;
pub use crate::error::{LockError, LockResult};
pub use crate::options::LockOptions;
pub use crate::outcome::{AcquireOutcome, LockReply, LockStatus, ReleaseOutcome};
pub use crate::traits::{AdvisoryLock, LockProvider, LockProviderExt};
