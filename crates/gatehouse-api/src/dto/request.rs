//! Request DTOs with validation.

use serde::Deserialize;
use validator::Validate;

use gatehouse_entity::user::UserStatus;

/// `POST /auth/login`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login identifier. `username` is accepted as an alias.
    #[serde(alias = "username")]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// `app` or `portal`.
    #[validate(length(min = 1, message = "Grant type is required"))]
    pub grant_type: String,
}

/// `POST /auth/refresh-token`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// `PATCH /users/me/password`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 1))]
    pub new_password: String,
}

/// `POST /admin/users`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 3, max = 32))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub last_name: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
}

/// `PATCH /admin/users/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 3, max = 32))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub status: Option<UserStatus>,
}

fn default_role() -> String {
    "user".to_string()
}
