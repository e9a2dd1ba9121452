//! Random mix error types

use lms_remote_lms_client::LmsError;
use thiserror::Error;

/// Errors raised while configuring or starting a random mix
#[derive(Error, Debug)]
pub enum MixError {
    /// The media server rejected or failed a request
    #[error("media server request failed: {0}")]
    Transport(#[from] LmsError),

    /// Input rejected locally before any remote call
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A saved mix could not be read
    #[error("saved mix '{0}' not found")]
    NotFound(String),
}

impl MixError {
    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, MixError::Transport(e) if e.is_retryable())
    }
}

/// Result type for random mix operations
pub type MixResult<T> = Result<T, MixError>;
