//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A login session bound to one refresh token.
///
/// A session is valid iff it is not blocked and `now < expires_at`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier (carried as `id` in refresh tokens).
    pub id: Uuid,
    /// The identity this session belongs to.
    pub user_id: Uuid,
    /// IP address the session was last used from.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: String,
    /// Revoked sessions are blocked; they never become valid again.
    pub is_blocked: bool,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
    /// When the session was created (login time).
    pub created_at: DateTime<Utc>,
    /// Last update (refresh or revoke).
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new active session expiring `ttl` from now.
    pub fn new(
        user_id: Uuid,
        ip_address: impl Into<String>,
        user_agent: impl Into<String>,
        ttl: chrono::Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            ip_address: ip_address.into(),
            user_agent: user_agent.into(),
            is_blocked: false,
            expires_at: now + ttl,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the session has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Check whether the session is usable right now.
    pub fn is_valid(&self) -> bool {
        !self.is_blocked && !self.is_expired()
    }
}

/// Partial update of a session. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionPatch {
    /// New client IP.
    pub ip_address: Option<String>,
    /// New user agent.
    pub user_agent: Option<String>,
    /// New blocked flag.
    pub is_blocked: Option<bool>,
    /// New expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionPatch {
    /// A patch that revokes the session.
    pub fn block() -> Self {
        Self {
            is_blocked: Some(true),
            ..Self::default()
        }
    }

    /// A patch that records the client a refresh came from.
    pub fn touch(ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            ip_address: Some(ip_address.into()),
            user_agent: Some(user_agent.into()),
            ..Self::default()
        }
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.ip_address.is_none()
            && self.user_agent.is_none()
            && self.is_blocked.is_none()
            && self.expires_at.is_none()
    }

    /// Apply the patch to an in-memory record.
    pub fn apply_to(&self, session: &mut Session) {
        if let Some(ip) = &self.ip_address {
            session.ip_address = ip.clone();
        }
        if let Some(ua) = &self.user_agent {
            session.user_agent = ua.clone();
        }
        if let Some(blocked) = self.is_blocked {
            session.is_blocked = blocked;
        }
        if let Some(expires_at) = self.expires_at {
            session.expires_at = expires_at;
        }
        session.updated_at = Utc::now();
    }
}
