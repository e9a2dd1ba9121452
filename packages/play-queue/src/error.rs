//! Play queue error types

use lms_remote_lms_client::LmsError;
use thiserror::Error;

/// Errors surfaced by the queue synchronizer
#[derive(Error, Debug)]
pub enum QueueError {
    /// A read of queue state failed; the last good state is kept
    #[error("queue fetch failed: {0}")]
    TransientFetch(String),

    /// A mutating command was rejected by the server
    #[error("queue command failed: {0}")]
    Command(String),

    /// Input rejected locally before any remote call
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The synchronizer task is no longer running
    #[error("queue synchronizer has shut down")]
    Closed,
}

impl QueueError {
    /// Convert a transport error raised by a read
    pub fn fetch(err: LmsError) -> Self {
        Self::TransientFetch(err.to_string())
    }

    /// Convert a transport error raised by a mutation
    pub fn command(err: LmsError) -> Self {
        Self::Command(err.to_string())
    }
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;
