//! Error types for the bell schedule ingestion service.

use thiserror::Error;

use crate::store::StoreError;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while ingesting or serving schedules.
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Document store error (duplicate keys never reach this far)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// CSV structure error (missing header, unbalanced quoting, missing column)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A row parsed as CSV but one of its fields could not be interpreted
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Csv(_) | Error::MalformedInput(_) | Error::Validation(_) => 400,
            Error::Auth(_) => 401,
            Error::NotFound(_) => 404,
            _ => 500,
        }
    }

    /// Whether the error was caused by the uploaded content rather than the backend.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::Csv(_) | Error::MalformedInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::MalformedInput("bad date".into()).status_code(), 400);
        assert_eq!(Error::Auth("no token".into()).status_code(), 401);
        assert_eq!(Error::NotFound("US Day 9".into()).status_code(), 404);
        assert_eq!(
            Error::Store(StoreError::Backend("connection reset".into())).status_code(),
            500
        );
    }

    #[test]
    fn test_vanished_replace_target_is_a_server_error() {
        let err = Error::Store(StoreError::NotFound {
            collection: "schedules",
            key: "US Day 1".into(),
        });
        assert_eq!(err.status_code(), 500);
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_input_errors() {
        assert!(Error::MalformedInput("x".into()).is_input_error());
        assert!(!Error::Internal("x".into()).is_input_error());
    }
}
