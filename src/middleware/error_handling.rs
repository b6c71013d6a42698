// ============================================================================
// Error Handling - Typed Errors and HTTP Mapping
// ============================================================================
//
// Input problems (blank query, bad coordinates, failed validation) are
// detected before any store access and answered with 400. Store failures are
// logged in full server-side and answered with a generic 503 so callers can
// tell "no results" apart from "the search could not run".
//
// ============================================================================

use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::middleware::metrics::record_store_failure;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Query string error: {0}")]
    Query(#[from] QueryRejection),

    #[error("Path error: {0}")]
    Path(#[from] PathRejection),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Client-input errors are never worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::StoreUnavailable(_))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Store error: {:?}", err);
        record_store_failure(match &err {
            sqlx::Error::PoolTimedOut => "pool_timeout",
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolClosed => "connection",
            _ => "query",
        });
        AppError::StoreUnavailable(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidQuery(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidCoordinates(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation failed".to_string()),
            AppError::Query(ref e) => {
                tracing::debug!("Query string rejected: {}", e.body_text());
                (StatusCode::BAD_REQUEST, "Invalid query parameters".to_string())
            }
            AppError::Path(ref e) => {
                tracing::debug!("Path rejected: {}", e.body_text());
                (StatusCode::BAD_REQUEST, "Invalid path parameter".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::StoreUnavailable(_) => {
                // Already logged where the store error was converted
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable".to_string(),
                )
            }
            AppError::Internal(err) => {
                tracing::error!("Internal error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
