//! Token response value type.

use serde::{Deserialize, Serialize};

/// Credentials returned by login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    /// Short-lived access token.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    /// Session-bound refresh token.
    pub refresh_token: String,
}

impl AuthToken {
    /// Build a bearer token response.
    pub fn bearer(access_token: String, expires_in: u64, refresh_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            expires_in,
            refresh_token,
        }
    }
}
