//! Maps domain `AppError` to HTTP responses.

use std::any::Any;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use gatehouse_core::error::{AppError, ErrorKind};

/// Error envelope returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Handler-facing error. Wraps [`AppError`] so it can become a response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self(AppError::validation(errors.to_string()))
    }
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidGrantType | ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::InvalidCredentials
        | ErrorKind::UserBlocked
        | ErrorKind::InvalidRefreshToken
        | ErrorKind::TokenExpired
        | ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = status_for(err.kind);

        // Internal details stay in the log.
        let message = if err.kind == ErrorKind::Internal {
            match &err.source {
                Some(source) => {
                    tracing::error!(error = %err.message, source = %source, "Internal server error")
                }
                None => tracing::error!(error = %err.message, "Internal server error"),
            }
            "Internal server error".to_string()
        } else {
            err.message
        };

        let body = ApiErrorResponse {
            error: err.kind.code().to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Response for a handler that panicked.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(panic = %detail, "Request handler panicked");

    ApiError(AppError::internal("Request handler panicked")).into_response()
}
