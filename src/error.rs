use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors that cross the service boundary. Calculator-internal faults never
/// become a `MatchError`; they are absorbed at the aggregator and degrade to
/// neutral-default scoring.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Underlying store unavailable. Retryable by the caller; this service
    /// does not run its own retry loop.
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl IntoResponse for MatchError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            MatchError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            MatchError::InvalidArgument(m) => (StatusCode::BAD_REQUEST, m.clone()),
            MatchError::Store(e) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
