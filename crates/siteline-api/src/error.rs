//! API error types and JSON error response formatting.
//!
//! Every error body carries `success: false` so the site widget can branch
//! on a single flag.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use siteline_chat::ChatError;
use siteline_core::error::SitelineError;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid input.
    BadRequest(String),
    /// 429 Too Many Requests.
    TooManyRequests,
    /// 500 Internal Server Error, with an optional diagnostic.
    Internal {
        error: String,
        details: Option<String>,
    },
}

impl ApiError {
    pub fn internal(error: impl Into<String>, details: impl Into<String>) -> Self {
        ApiError::Internal {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded".to_string(),
                None,
            ),
            ApiError::Internal { error: msg, details } => {
                error!(error = %msg, details = ?details, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg, details)
            }
        };

        let body = ErrorBody {
            success: false,
            error,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyMessage | ChatError::MessageTooLong(_) => {
                ApiError::BadRequest(err.to_string())
            }
            other => ApiError::internal("Failed to process message", other.to_string()),
        }
    }
}

impl From<SitelineError> for ApiError {
    fn from(err: SitelineError) -> Self {
        ApiError::internal("Internal server error", err.to_string())
    }
}
