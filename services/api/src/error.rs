//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, and the mapping
//! from service errors to HTTP responses.

use crate::config::ConfigError;
use axum::http::StatusCode;
use tracing::error;
use wordflow_core::{PortError, ServiceError};

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure to apply the database migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// Converts a service error into the `(status, message)` pair returned by handlers.
///
/// Upload rejections carry a user-facing message; storage and integrity
/// failures are logged and reported generically.
pub fn service_error_response(err: ServiceError) -> (StatusCode, String) {
    match err {
        ServiceError::UnsupportedFileType | ServiceError::EmptyDocument => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        ServiceError::Extraction(e) => (StatusCode::BAD_REQUEST, e.to_string()),
        ServiceError::Port(PortError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, "Document not found".to_string())
        }
        ServiceError::Port(PortError::Unauthorized) => {
            (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
        }
        ServiceError::Port(PortError::Conflict(message)) => (StatusCode::CONFLICT, message),
        other => {
            error!("Request failed: {:?}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred while processing the request.".to_string(),
            )
        }
    }
}
