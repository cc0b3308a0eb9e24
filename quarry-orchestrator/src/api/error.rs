//! API Error Handling
//!
//! Unified error type and conversion for API responses. Every non-2xx
//! response body is the JSON envelope `{ "error": "<message>" }` so
//! callers can surface the message directly.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::service::run::RunError;
use crate::service::schedule::ScheduleError;
use crate::store::StoreError;

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    StoreError(StoreError),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::StoreError(err) => {
                tracing::error!("Store error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<RunError> for ApiError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::Invalid(msg) => ApiError::BadRequest(msg),
            RunError::NotFound(id) => ApiError::NotFound(format!("Run {} not found", id)),
            RunError::AlreadyTerminal(id) => {
                ApiError::Conflict(format!("Run {} is already terminal", id))
            }
            RunError::Store(err) => ApiError::StoreError(err),
        }
    }
}

impl From<ScheduleError> for ApiError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::Invalid(msg) => ApiError::BadRequest(msg),
            ScheduleError::Scheduler(err) => ApiError::BadRequest(err.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
