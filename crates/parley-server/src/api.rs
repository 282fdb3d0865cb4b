//! Error responses shared by the API handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parley_types::{Stage, StoreError};
use thiserror::Error;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
    /// A conversation pipeline invocation failed in `stage`.
    #[error("{stage} stage failed: {message}")]
    Pipeline { stage: Stage, message: String },
}

/// Status code reported for a pipeline failure in `stage`.
pub fn stage_status(stage: Stage) -> StatusCode {
    match stage {
        Stage::Recognition => StatusCode::UNPROCESSABLE_ENTITY,
        Stage::PersonaLookup => StatusCode::NOT_FOUND,
        Stage::Generation | Stage::Synthesis => StatusCode::BAD_GATEWAY,
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(msg) => ApiError::ServiceUnavailable(msg),
            StoreError::Query(msg) => ApiError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, serde_json::json!({ "error": msg })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, serde_json::json!({ "error": msg })),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, serde_json::json!({ "error": msg }))
            }
            ApiError::InternalServerError(msg) => {
                tracing::error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, serde_json::json!({ "error": msg }))
            }
            ApiError::Pipeline { stage, message } => (
                stage_status(stage),
                serde_json::json!({ "error": message, "stage": stage }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
