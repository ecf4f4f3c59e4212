//! API error types and handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Details attached to every 500 response.
pub const ANALYSIS_FAILURE_DETAILS: &str = "An error occurred during analysis";

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    /// Missing, unreadable or malformed upload.
    BadRequest(String),
    /// Upload exceeds the body limit.
    PayloadTooLarge(String),
    /// The analysis itself failed.
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'static str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg, None),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg,
                Some(ANALYSIS_FAILURE_DETAILS),
            ),
        };

        if status.is_server_error() {
            tracing::error!(%error, "analysis request failed");
        } else {
            tracing::debug!(%status, %error, "rejected request");
        }

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}

impl From<tabula::TabulaError> for ApiError {
    fn from(err: tabula::TabulaError) -> Self {
        if err.is_input_error() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}
