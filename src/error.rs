//! Error types for the storefront cache service
//!
//! Store errors stay inside the cache layer. API errors are what handlers
//! return and know how to render themselves as JSON envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::persistence::RepoError;
use crate::validation::{FieldErrors, PipelineError};

// == Store Error Enum ==
/// Failures reported by a key-value store binding.
///
/// `CacheManager` swallows every one of these and degrades to a miss.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or refused the operation
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Key is empty or longer than the store accepts
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Value exceeds the store's size limit
    #[error("value too large: {size} bytes (max {max})")]
    ValueTooLarge { size: usize, max: usize },
}

/// Convenience Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// == Api Error Enum ==
/// Errors surfaced by HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Field-level validation failure, user correctable
    #[error("validation failed")]
    Validation(FieldErrors),

    /// Malformed request that never reached validation
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Unique constraint clash (duplicate slug)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Anything fatal to the request; the detail is logged, never returned
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(what) => ApiError::NotFound(what),
            RepoError::Duplicate(slug) => {
                ApiError::Conflict(format!("slug '{}' is already in use", slug))
            }
            RepoError::Backend(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "error": "Validation failed", "errors": errors }),
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "error": msg }),
            ),
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "success": false, "error": format!("{} not found", what) }),
            ),
            ApiError::Conflict(msg) => (
                StatusCode::CONFLICT,
                json!({ "success": false, "error": msg }),
            ),
            ApiError::Internal(detail) => {
                error!("request failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "success": false, "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_errors_map_to_api_errors() {
        assert!(matches!(
            ApiError::from(RepoError::NotFound("product".into())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(RepoError::Duplicate("foam".into())),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(RepoError::Backend("disk".into())),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn test_internal_error_hides_detail() {
        let response = ApiError::Internal("connection reset by peer".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_error_status() {
        let mut errors = FieldErrors::new();
        errors.insert("name", "Name is required");
        let response = ApiError::Validation(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
