//! `AuthUser` extractor: verifies the bearer access token.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use gatehouse_auth::AccessClaims;
use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;

use crate::error::ApiError;
use crate::state::AppState;

/// Claims of the caller's access token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AccessClaims);

impl AuthUser {
    /// `Forbidden` unless the caller's role may perform `action` on `object`.
    pub fn require(&self, state: &AppState, object: &str, action: &str) -> AppResult<()> {
        state.rbac.require(&self.0.role, object, action)
    }
}

impl std::ops::Deref for AuthUser {
    type Target = AccessClaims;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

        let token = bearer_token(header)
            .ok_or_else(|| AppError::unauthorized("Invalid Authorization header format"))?;

        let claims = state.session_manager.authenticate(token).map_err(|e| {
            // Every bearer failure is a plain 401 on protected routes.
            if e.kind == ErrorKind::TokenExpired {
                AppError::unauthorized("Access token has expired")
            } else {
                e
            }
        })?;

        Ok(AuthUser(claims))
    }
}

/// The credential of a `Bearer <token>` header. The scheme is case-insensitive.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer   abc "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }
}
