//! Queue error types.

use std::path::PathBuf;
use thiserror::Error;

pub type QueueResult<T> = Result<T, QueueError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("Already queued: {0}")]
    Duplicate(PathBuf),

    #[error("Not in queue: {0}")]
    NotFound(PathBuf),
}
