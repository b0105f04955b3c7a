//! Error type system for Railbook
//!
//! This module provides the error type system with:
//! - Hierarchical error classification
//! - HTTP status code mapping
//! - Error responses with trace IDs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Main error type for the Railbook system
#[derive(Debug, thiserror::Error)]
pub enum RailError {
    // System-level errors
    #[error("System initialization failed: {0}")]
    InitializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    // API-related errors
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    // I/O errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Network error: {0}")]
    NetworkError(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // Background task errors (blocking pool joins)
    #[error("Task error: {0}")]
    TaskError(String),
}

impl RailError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            RailError::InvalidRequest(_)
            | RailError::SerializationError(_)
            | RailError::ValidationError(_) => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            RailError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            RailError::PermissionDenied(_) => StatusCode::FORBIDDEN,

            // 404 Not Found
            RailError::NotFound(_) => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            RailError::InitializationError(_)
            | RailError::ConfigError(_)
            | RailError::DatabaseError(_)
            | RailError::IoError(_)
            | RailError::NetworkError(_)
            | RailError::TaskError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type name for API responses
    pub fn error_type(&self) -> &'static str {
        match self {
            RailError::InitializationError(_) => "InitializationError",
            RailError::ConfigError(_) => "ConfigError",
            RailError::DatabaseError(_) => "DatabaseError",
            RailError::InvalidRequest(_) => "InvalidRequest",
            RailError::AuthenticationError(_) => "AuthenticationError",
            RailError::NotFound(_) => "NotFound",
            RailError::PermissionDenied(_) => "PermissionDenied",
            RailError::ValidationError(_) => "ValidationError",
            RailError::IoError(_) => "IoError",
            RailError::NetworkError(_) => "NetworkError",
            RailError::SerializationError(_) => "SerializationError",
            RailError::TaskError(_) => "TaskError",
        }
    }

    /// The bare message for API responses, without the variant prefix
    pub fn message(&self) -> String {
        match self {
            RailError::InitializationError(msg)
            | RailError::ConfigError(msg)
            | RailError::InvalidRequest(msg)
            | RailError::AuthenticationError(msg)
            | RailError::NotFound(msg)
            | RailError::PermissionDenied(msg)
            | RailError::ValidationError(msg)
            | RailError::NetworkError(msg)
            | RailError::SerializationError(msg)
            | RailError::TaskError(msg) => msg.clone(),
            RailError::DatabaseError(e) => e.to_string(),
            RailError::IoError(e) => e.to_string(),
        }
    }

    /// Check whether the error stems from a SQLite UNIQUE constraint violation.
    ///
    /// Register relies on this to tell a duplicate email apart from other
    /// store failures instead of collapsing everything into one message. The
    /// extended result code matters: FOREIGN KEY, NOT NULL and CHECK failures
    /// share the primary ConstraintViolation code but are not duplicates.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            RailError::DatabaseError(rusqlite::Error::SqliteFailure(e, _)) => {
                e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            }
            _ => false,
        }
    }
}

impl From<serde_json::Error> for RailError {
    fn from(err: serde_json::Error) -> Self {
        RailError::SerializationError(err.to_string())
    }
}

/// Error response structure for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Unique trace ID for this error
    pub trace_id: String,
}

impl ErrorResponse {
    /// Create a new error response with a generated trace ID
    pub fn new(error: String, message: String) -> Self {
        Self {
            error,
            message,
            trace_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an error response from a RailError
    ///
    /// The `error` field carries the taxonomy; `message` is the bare inner
    /// message so clients can match on it without parsing variant prefixes.
    pub fn from_error(error: &RailError) -> Self {
        Self::new(error.error_type().to_string(), error.message())
    }
}

/// Implement IntoResponse for RailError to enable automatic error handling in Axum
impl IntoResponse for RailError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_response = ErrorResponse::from_error(&self);

        tracing::error!(
            error_type = self.error_type(),
            trace_id = %error_response.trace_id,
            status_code = %status_code,
            "Request failed: {}",
            self
        );

        (status_code, Json(error_response)).into_response()
    }
}

/// Result type alias for operations that can fail with RailError
pub type Result<T> = std::result::Result<T, RailError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            RailError::InvalidRequest("test".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RailError::AuthenticationError("test".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            RailError::PermissionDenied("test".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            RailError::NotFound("test".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RailError::DatabaseError(rusqlite::Error::InvalidQuery).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            RailError::InvalidRequest("test".into()).error_type(),
            "InvalidRequest"
        );
        assert_eq!(
            RailError::ValidationError("test".into()).error_type(),
            "ValidationError"
        );
    }

    fn constraint_failure(extended_code: i32, message: &str) -> RailError {
        RailError::DatabaseError(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: rusqlite::ErrorCode::ConstraintViolation,
                extended_code,
            },
            Some(message.to_string()),
        ))
    }

    #[test]
    fn test_unique_violation_detection() {
        let unique = constraint_failure(
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            "UNIQUE constraint failed: users.email",
        );
        assert!(unique.is_unique_violation());

        let pk = constraint_failure(
            rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY,
            "UNIQUE constraint failed: stations.code",
        );
        assert!(pk.is_unique_violation());

        assert!(!RailError::DatabaseError(rusqlite::Error::InvalidQuery).is_unique_violation());
        assert!(!RailError::NotFound("x".into()).is_unique_violation());
    }

    #[test]
    fn test_other_constraint_failures_are_not_unique_violations() {
        // FOREIGN KEY, NOT NULL and CHECK share the ConstraintViolation
        // primary code but must not read as duplicates
        for (extended_code, message) in [
            (rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY, "FOREIGN KEY constraint failed"),
            (rusqlite::ffi::SQLITE_CONSTRAINT_NOTNULL, "NOT NULL constraint failed: users.email"),
            (rusqlite::ffi::SQLITE_CONSTRAINT_CHECK, "CHECK constraint failed"),
        ] {
            assert!(
                !constraint_failure(extended_code, message).is_unique_violation(),
                "{} misread as a unique violation",
                message
            );
        }
    }

    #[test]
    fn test_error_response_creation() {
        let error = RailError::NotFound("booking 42".into());
        let response = ErrorResponse::from_error(&error);

        assert_eq!(response.error, "NotFound");
        assert_eq!(response.message, "booking 42");
        assert!(!response.trace_id.is_empty());
    }

    #[test]
    fn test_response_message_has_no_variant_prefix() {
        let error = RailError::InvalidRequest("Email already exists".into());
        let response = ErrorResponse::from_error(&error);

        assert_eq!(response.message, "Email already exists");
        // The Display form keeps the prefix for logs
        assert_eq!(error.to_string(), "Invalid request: Email already exists");
    }

    #[test]
    fn test_serde_json_errors_convert() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let converted = RailError::from(err);
        assert!(matches!(converted, RailError::SerializationError(_)));
    }
}
