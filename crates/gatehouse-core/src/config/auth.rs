//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Token signing and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for HMAC token signing.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Signing algorithm, fixed for the lifetime of the process.
    #[serde(default = "default_jwt_algorithm")]
    pub jwt_algorithm: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_seconds: u64,
    /// Refresh token (and session) lifetime in seconds.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_seconds: u64,
    /// Roles allowed to log in through the `app` grant.
    #[serde(default = "default_app_roles")]
    pub app_roles: Vec<String>,
    /// Roles allowed to log in through the `portal` grant.
    #[serde(default = "default_portal_roles")]
    pub portal_roles: Vec<String>,
    /// Minimum password length for new passwords.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_algorithm: default_jwt_algorithm(),
            access_token_ttl_seconds: default_access_ttl(),
            refresh_token_ttl_seconds: default_refresh_ttl(),
            app_roles: default_app_roles(),
            portal_roles: default_portal_roles(),
            password_min_length: default_password_min(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_jwt_algorithm() -> String {
    "HS256".to_string()
}

fn default_access_ttl() -> u64 {
    60 * 60
}

fn default_refresh_ttl() -> u64 {
    24 * 60 * 60
}

fn default_app_roles() -> Vec<String> {
    vec!["user".to_string()]
}

fn default_portal_roles() -> Vec<String> {
    vec!["admin".to_string(), "superadmin".to_string()]
}

fn default_password_min() -> usize {
    8
}
