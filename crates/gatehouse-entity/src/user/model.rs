//! Identity entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::UserStatus;

/// A registered identity.
///
/// `email` and `phone` are stored lowercased and trimmed; uniqueness is
/// enforced across non-deleted identities.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique identifier.
    pub id: Uuid,
    /// Login email address.
    pub email: String,
    /// Phone number (optional).
    pub phone: Option<String>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role tag checked by the permission engine.
    pub role: String,
    /// Account status.
    pub status: UserStatus,
    /// Last successful login or token refresh.
    pub last_login_at: Option<DateTime<Utc>>,
    /// Most recently issued refresh token.
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    /// When the identity was created.
    pub created_at: DateTime<Utc>,
    /// When the identity was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a new active identity. Contact fields are normalized.
    pub fn new(
        email: &str,
        phone: Option<&str>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        password_hash: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            email: normalize_contact(email),
            phone: phone.map(normalize_contact).filter(|p| !p.is_empty()),
            first_name: first_name.into(),
            last_name: last_name.into(),
            password_hash: password_hash.into(),
            role: role.into(),
            status: UserStatus::Active,
            last_login_at: None,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Display name carried in access tokens.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Whether the identity is blocked.
    pub fn is_blocked(&self) -> bool {
        self.status == UserStatus::Blocked
    }

    /// Whether the identity has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.status == UserStatus::Deleted
    }
}

/// Case-normalize an email or phone value.
pub fn normalize_contact(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Partial update of an identity. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    /// New email address.
    pub email: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
    /// New password hash.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// New role.
    pub role: Option<String>,
    /// New status.
    pub status: Option<UserStatus>,
    /// New last-login timestamp.
    pub last_login_at: Option<DateTime<Utc>>,
    /// New refresh-token reference.
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
}

impl UserPatch {
    /// Normalize contact fields in place.
    pub fn normalized(mut self) -> Self {
        self.email = self.email.as_deref().map(normalize_contact);
        self.phone = self.phone.as_deref().map(normalize_contact);
        self
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.phone.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
            && self.status.is_none()
            && self.last_login_at.is_none()
            && self.refresh_token.is_none()
    }

    /// Apply the patch to an in-memory record.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            user.phone = Some(phone.clone()).filter(|p| !p.is_empty());
        }
        if let Some(first_name) = &self.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &self.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(hash) = &self.password_hash {
            user.password_hash = hash.clone();
        }
        if let Some(role) = &self.role {
            user.role = role.clone();
        }
        if let Some(status) = self.status {
            user.status = status;
        }
        if let Some(at) = self.last_login_at {
            user.last_login_at = Some(at);
        }
        if let Some(token) = &self.refresh_token {
            user.refresh_token = Some(token.clone());
        }
        user.updated_at = Utc::now();
    }
}
