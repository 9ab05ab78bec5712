//! Errors raised by the named lock pool.
#![forbid(unsafe_code)]

use std::time::Duration;

use thiserror::Error;

/// Errors returned by [`NamedLockPool`](crate::NamedLockPool).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LockPoolError {
    /// The lock stayed busy for the whole bounded wait.
    #[error("timed out after {waited:?} waiting for lock {key:?}")]
    Timeout {
        /// Key that could not be acquired.
        key: String,
        /// How long the caller waited.
        waited: Duration,
    },
    /// A release found no held lock under the key.
    #[error("lock {key:?} is not held")]
    NotHeld {
        /// Key that was released.
        key: String,
    },
}
