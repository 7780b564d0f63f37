//! Application layer errors

use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Remote API errors (internal; callers see Option/bool, see `infrastructure::api`)
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("API returned status {0}: {1}")]
    Status(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("API rejected request: {0}")]
    Rejected(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
