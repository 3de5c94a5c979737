//! Unified application error types for Gatehouse.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. The HTTP boundary turns the
//! [`ErrorKind`] into a status code and the stable code string below.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Login failed: unknown identity, wrong password or wrong grant/role pair.
    InvalidCredentials,
    /// The requested grant context is not recognized.
    InvalidGrantType,
    /// The identity exists but is blocked.
    UserBlocked,
    /// The refresh token could not be parsed or its session is gone.
    InvalidRefreshToken,
    /// The session bound to a refresh token has expired.
    TokenExpired,
    /// A bearer credential is missing or invalid.
    Unauthorized,
    /// The caller may not perform the action.
    Forbidden,
    /// The requested resource was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A uniqueness constraint was violated.
    Conflict,
    /// An internal error occurred (storage, signing, configuration).
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code exposed to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidGrantType => "INVALID_GRANT_TYPE",
            Self::UserBlocked => "USER_BLOCKED",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION_ERROR",
            Self::Conflict => "CONFLICT",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The unified application error used throughout Gatehouse.
///
/// The `source` is kept for logging only; it is never serialized to clients.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The generic login failure. Deliberately carries no detail.
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::InvalidCredentials, "Invalid credentials")
    }

    /// Create an invalid-grant-type error.
    pub fn invalid_grant_type(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidGrantType, message)
    }

    /// Create a user-blocked error.
    pub fn user_blocked() -> Self {
        Self::new(ErrorKind::UserBlocked, "User account is blocked")
    }

    /// Create an invalid-refresh-token error.
    pub fn invalid_refresh_token() -> Self {
        Self::new(ErrorKind::InvalidRefreshToken, "Invalid refresh token")
    }

    /// Create a token-expired error.
    pub fn token_expired() -> Self {
        Self::new(ErrorKind::TokenExpired, "Token has expired")
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Attach an underlying cause to an existing error.
    pub fn caused_by(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Validation,
            format!("Malformed JSON: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Internal,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
