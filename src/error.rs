//! Error handling module for the feedback service
//!
//! This module defines the error types used throughout the application and
//! maps them onto the `{"error": ..., "field": ...}` HTTP response body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ValidationError;

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message returned to the client when the store rejects a write
pub const STORAGE_FAILURE_MESSAGE: &str = "Failed to save feedback. Please try again later.";

/// Field reported for failures that are not the caller's fault
pub const SERVER_FIELD: &str = "server";

/// Main error type for the feedback service
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(String),

    /// Rejected submission
    #[error("Validation error: {0}")]
    Validation(ValidationError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a database error
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Error::Database(msg.into())
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Config(_)
            | Error::Database(_)
            | Error::Serialization(_)
            | Error::Io(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing body. Server-side causes are never exposed.
    pub fn to_body(&self) -> ErrorBody {
        match self {
            Error::Validation(e) => ErrorBody {
                error: e.message.to_string(),
                field: e.field.as_str().to_string(),
            },
            Error::Database(_) => ErrorBody {
                error: STORAGE_FAILURE_MESSAGE.to_string(),
                field: SERVER_FIELD.to_string(),
            },
            _ => ErrorBody {
                error: "Internal server error".to_string(),
                field: SERVER_FIELD.to_string(),
            },
        }
    }
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message
    pub error: String,
    /// Field that caused the failure, or `server`
    pub field: String,
}

/// Implement IntoResponse for automatic error responses in Axum
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log error based on severity
        match &self {
            Error::Validation(e) => {
                tracing::warn!(field = %e.field, reason = %e.message, "Feedback rejected");
            },
            _ => {
                tracing::error!(error = ?self, "Internal server error");
            },
        }

        (status, Json(self.to_body())).into_response()
    }
}

/// Convert from envconfig::Error to our Error type
impl From<envconfig::Error> for Error {
    fn from(err: envconfig::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;

    #[test]
    fn test_error_status_codes() {
        let validation = Error::from(ValidationError::new(Field::Rating, "bad"));
        assert_eq!(validation.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::database("test").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::internal("test").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_body_carries_field() {
        let body = Error::from(ValidationError::new(Field::Email, "Email must be a valid address"))
            .to_body();
        assert_eq!(body.field, "email");
        assert_eq!(body.error, "Email must be a valid address");
    }

    #[test]
    fn test_database_body_hides_cause() {
        let body = Error::database("connection refused on 10.0.0.3:5432").to_body();
        assert_eq!(body.field, "server");
        assert_eq!(body.error, STORAGE_FAILURE_MESSAGE);
        assert!(!body.error.contains("10.0.0.3"));
    }
}
