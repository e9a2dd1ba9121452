//! Errors raised while reading `LMS_*` and `QUEUE_*` settings

use thiserror::Error;

/// Why the media server or queue settings could not be loaded
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A setting the caller requires (such as `LMS_PLAYER_ID`) is unset
    #[error("{0} is not set")]
    MissingEnvVar(String),

    /// A numeric or boolean setting did not parse
    #[error("{0} has an invalid value: {1}")]
    InvalidValue(String, String),

    /// The server URL is malformed or not http(s)
    #[error("{0} is not a usable server URL: {1}")]
    InvalidUrl(String, String),

    /// Settings parsed but are inconsistent (zero page size, ...)
    #[error("invalid queue settings: {0}")]
    ValidationError(String),
}

/// Result of loading configuration
pub type ConfigResult<T> = Result<T, ConfigError>;
