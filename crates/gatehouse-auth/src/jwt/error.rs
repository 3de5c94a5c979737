//! Token-level failures.

use thiserror::Error;

use gatehouse_core::error::{AppError, ErrorKind};

/// Why a token could not be issued or accepted.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The requested token kind is not recognized.
    #[error("invalid token type: {0}")]
    InvalidTokenType(String),
    /// Signing failed.
    #[error("failed to sign token: {0}")]
    SigningFailure(#[source] jsonwebtoken::errors::Error),
    /// The token could not be parsed or its claims have the wrong shape.
    #[error("malformed token")]
    MalformedToken(#[source] Option<jsonwebtoken::errors::Error>),
    /// Bad signature, or the header declares a different algorithm.
    #[error("token signature mismatch")]
    SignatureMismatch,
    /// The expiry claim is in the past.
    #[error("token expired")]
    Expired,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind as Jwt;

        match err.kind() {
            Jwt::ExpiredSignature => Self::Expired,
            Jwt::InvalidSignature | Jwt::InvalidAlgorithm | Jwt::InvalidAlgorithmName => {
                Self::SignatureMismatch
            }
            _ => Self::MalformedToken(Some(err)),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AppError::token_expired(),
            TokenError::InvalidTokenType(_) | TokenError::SigningFailure(_) => {
                AppError::with_source(ErrorKind::Internal, "Failed to issue token", err)
            }
            TokenError::MalformedToken(_) | TokenError::SignatureMismatch => {
                AppError::with_source(ErrorKind::Unauthorized, "Invalid token", err)
            }
        }
    }
}
