//! Error types for the media server client

use thiserror::Error;

/// Errors that can occur when talking to the media server
#[derive(Error, Debug)]
pub enum LmsError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to serialize/deserialize JSON
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Server answered with a non-success status
    #[error("LMS API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Response carried no `result` object
    #[error("LMS response for '{0}' has no result")]
    MissingResult(String),

    /// Result object did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client configuration could not be loaded
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Request timeout
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Connection refused (server not running)
    #[error("Connection refused. Is LMS running at {0}?")]
    ConnectionRefused(String),

    /// All retry attempts exhausted
    #[error("All {attempts} retry attempts failed. Last error: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

impl LmsError {
    /// Check if this error is retryable (transient)
    ///
    /// Retries on timeouts, refused connections, transport failures and
    /// server errors (5xx). Client errors and malformed payloads are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            LmsError::Timeout(_) | LmsError::ConnectionRefused(_) => true,
            LmsError::HttpError(e) => {
                if e.is_timeout() || e.is_connect() {
                    return true;
                }
                matches!(e.status(), Some(status) if status.is_server_error())
            }
            LmsError::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type for media server operations
pub type LmsResult<T> = Result<T, LmsError>;
