//! Error types for the Confluent Deployment Validator

use thiserror::Error;

/// Result type for the validator
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the validator
#[derive(Debug, Error)]
pub enum Error {
    /// Confluent Cloud API error
    #[error("Confluent Cloud API error: {0}")]
    ApiError(String),
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// Credentials error
    #[error("Credentials error: {0}")]
    CredentialsError(String),
    /// The API rejected the call with 401/403
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    /// Report serialization or I/O error
    #[error("Report error: {0}")]
    ReportError(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::ApiError(err.to_string())
    }
}
