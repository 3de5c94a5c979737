//! Claim shapes carried by access and refresh tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatehouse_entity::user::User;

use super::error::TokenError;

/// Which validity window a token is issued with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived token for API calls.
    Access,
    /// Session-bound token used to mint access tokens.
    Refresh,
}

impl TokenKind {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenKind {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(Self::Access),
            "refresh" => Ok(Self::Refresh),
            other => Err(TokenError::InvalidTokenType(other.to_string())),
        }
    }
}

/// Access token subject claims: `{id, email, name, role}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Identity id.
    pub id: Uuid,
    /// Identity email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role tag.
    pub role: String,
}

impl AccessClaims {
    /// Claims for an identity.
    pub fn for_user(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.display_name(),
            role: user.role.clone(),
        }
    }
}

/// Refresh token claims: `{id: session id, uid: identity id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Session id.
    pub id: Uuid,
    /// Identity id.
    pub uid: Uuid,
}

/// Claims plus the absolute expiry, as they appear on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expiring<C> {
    /// Subject claims.
    #[serde(flatten)]
    pub claims: C,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}
