//! Session lifecycle manager: login, refresh and revocation flows.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use gatehouse_core::config::{AuthConfig, SessionConfig};
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::traits::Repository;
use gatehouse_entity::session::{AuthToken, Session, SessionPatch, SessionStore};
use gatehouse_entity::user::{User, UserPatch, UserStore, normalize_contact};

use crate::jwt::{AccessClaims, RefreshClaims, TokenError, TokenKind, TokenService};
use crate::password::{PasswordHasher, PasswordValidator};

use super::grant::GrantType;

/// Credentials and client details for a login attempt.
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    pub grant_type: String,
    pub ip_address: String,
    pub user_agent: String,
}

/// Orchestrates the token service and the identity/session stores.
#[derive(Clone)]
pub struct SessionManager {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    tokens: Arc<TokenService>,
    hasher: PasswordHasher,
    auth_config: AuthConfig,
    session_config: SessionConfig,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("session_config", &self.session_config)
            .finish()
    }
}

impl SessionManager {
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        tokens: Arc<TokenService>,
        auth_config: AuthConfig,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            users,
            sessions,
            tokens,
            hasher: PasswordHasher::new(),
            auth_config,
            session_config,
        }
    }

    /// Authenticate and open a new session.
    ///
    /// Unknown identity, wrong password and a role not admitted by the grant
    /// all fail with the same `InvalidCredentials`. The blocked check runs
    /// last so account state is only revealed to holders of the password.
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthToken> {
        let email = normalize_contact(&input.email);

        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!(email = %email, "Login failed: unknown identity");
            return Err(AppError::invalid_credentials());
        };

        if !self
            .hasher
            .verify_password(&input.password, &user.password_hash)?
        {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AppError::invalid_credentials());
        }

        let grant: GrantType = input.grant_type.parse()?;
        if !grant.allows(&user.role, &self.auth_config) {
            warn!(
                user_id = %user.id,
                role = %user.role,
                grant = %grant,
                "Login failed: role not admitted by grant"
            );
            return Err(AppError::invalid_credentials());
        }

        if user.is_blocked() {
            warn!(user_id = %user.id, "Login failed: identity is blocked");
            return Err(AppError::user_blocked());
        }

        let ttl = self.tokens.ttl_seconds(TokenKind::Refresh);
        let session = Session::new(
            user.id,
            input.ip_address,
            input.user_agent,
            duration_seconds(ttl)?,
        );
        let session = self.sessions.create(&session).await?;

        // Supersede after the insert: racing logins never leave two active sessions.
        if self.session_config.single_session {
            let superseded = self
                .sessions
                .block_all_for_user_except(&user.id, &session.id)
                .await?;
            if superseded > 0 {
                info!(user_id = %user.id, superseded, "Blocked previous sessions");
            }
        }

        let (access_token, expires_in) = self
            .tokens
            .generate_token(TokenKind::Access, &AccessClaims::for_user(&user))?;
        let (refresh_token, _) = self.tokens.generate_token(
            TokenKind::Refresh,
            &RefreshClaims {
                id: session.id,
                uid: user.id,
            },
        )?;

        let patch = UserPatch {
            last_login_at: Some(Utc::now()),
            refresh_token: Some(refresh_token.clone()),
            ..UserPatch::default()
        };
        self.users.update(&user.id, &patch).await?;

        match self.sessions.delete_expired(Some(&user.id)).await {
            Ok(0) => {}
            Ok(purged) => info!(user_id = %user.id, purged, "Purged expired sessions"),
            Err(e) => warn!(user_id = %user.id, error = %e, "Expired session purge failed"),
        }

        info!(
            user_id = %user.id,
            session_id = %session.id,
            grant = %grant,
            "Login succeeded"
        );

        Ok(AuthToken::bearer(access_token, expires_in, refresh_token))
    }

    /// Mint a new access token from a refresh token.
    ///
    /// The session id and the refresh token are not rotated. An expired
    /// token or session is revoked before `TokenExpired` is returned. The
    /// session is only touched once its identity is known to be active.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        ip_address: &str,
        user_agent: &str,
    ) -> AppResult<AuthToken> {
        let claims: RefreshClaims = match self.tokens.parse_token(refresh_token) {
            Ok(claims) => claims,
            Err(TokenError::Expired) => return Err(self.revoke_expired(refresh_token).await),
            Err(e) => {
                warn!(error = %e, "Refresh rejected: unusable token");
                return Err(AppError::invalid_refresh_token());
            }
        };

        let Some(session) = self.sessions.find_active(&claims.id, &claims.uid).await? else {
            warn!(session_id = %claims.id, "Refresh rejected: no active session");
            return Err(AppError::invalid_refresh_token());
        };

        if session.is_expired() {
            return Err(self.block_expired(&session).await);
        }

        let user = self.active_user(&claims.uid).await?;

        self.sessions
            .update(&session.id, &SessionPatch::touch(ip_address, user_agent))
            .await?;

        let (access_token, expires_in) = self
            .tokens
            .generate_token(TokenKind::Access, &AccessClaims::for_user(&user))?;

        let patch = UserPatch {
            last_login_at: Some(Utc::now()),
            ..UserPatch::default()
        };
        self.users.update(&user.id, &patch).await?;

        info!(user_id = %user.id, session_id = %session.id, "Access token refreshed");

        Ok(AuthToken::bearer(
            access_token,
            expires_in,
            refresh_token.to_string(),
        ))
    }

    /// Handle a refresh token whose `exp` has passed: identify its session
    /// from the still-signed claims and block it.
    async fn revoke_expired(&self, refresh_token: &str) -> AppError {
        let claims: RefreshClaims = match self.tokens.parse_token_unchecked_exp(refresh_token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!(error = %e, "Refresh rejected: unusable expired token");
                return AppError::invalid_refresh_token();
            }
        };

        match self.sessions.find_active(&claims.id, &claims.uid).await {
            Ok(Some(session)) => self.block_expired(&session).await,
            Ok(None) => {
                warn!(session_id = %claims.id, "Refresh rejected: no active session");
                AppError::invalid_refresh_token()
            }
            Err(e) => {
                warn!(session_id = %claims.id, error = %e, "Expired session lookup failed");
                AppError::invalid_refresh_token()
            }
        }
    }

    async fn block_expired(&self, session: &Session) -> AppError {
        match self.sessions.update(&session.id, &SessionPatch::block()).await {
            Ok(_) => {
                info!(
                    session_id = %session.id,
                    user_id = %session.user_id,
                    "Expired session revoked on refresh"
                );
                AppError::token_expired()
            }
            Err(e) => {
                warn!(session_id = %session.id, error = %e, "Failed to revoke expired session");
                AppError::invalid_refresh_token()
            }
        }
    }

    /// Block a session. Revoking an already blocked session succeeds.
    pub async fn revoke(&self, session_id: &Uuid) -> AppResult<Session> {
        let mut session = self
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Session {session_id} not found")))?;

        if !session.is_blocked {
            let patch = SessionPatch::block();
            self.sessions.update(session_id, &patch).await?;
            patch.apply_to(&mut session);
            info!(session_id = %session_id, user_id = %session.user_id, "Session revoked");
        }

        Ok(session)
    }

    /// Purge expired sessions of one identity, or of all of them.
    pub async fn delete_expired(&self, user_id: Option<&Uuid>) -> AppResult<u64> {
        self.sessions.delete_expired(user_id).await
    }

    /// Verify a bearer access token and return its claims.
    pub fn authenticate(&self, access_token: &str) -> AppResult<AccessClaims> {
        Ok(self.tokens.parse_token(access_token)?)
    }

    /// Replace an identity's password after checking the current one.
    pub async fn change_password(
        &self,
        user_id: &Uuid,
        current: &str,
        replacement: &str,
        validator: &PasswordValidator,
    ) -> AppResult<()> {
        let user = self.active_user(user_id).await?;

        if !self.hasher.verify_password(current, &user.password_hash)? {
            return Err(AppError::invalid_credentials());
        }
        validator.validate_not_same(current, replacement)?;
        validator.validate(replacement)?;

        let patch = UserPatch {
            password_hash: Some(self.hasher.hash_password(replacement)?),
            ..UserPatch::default()
        };
        self.users.update(user_id, &patch).await?;

        info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    async fn active_user(&self, user_id: &Uuid) -> AppResult<User> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .filter(|u| !u.is_deleted())
            .ok_or_else(AppError::invalid_refresh_token)?;

        if user.is_blocked() {
            return Err(AppError::user_blocked());
        }
        Ok(user)
    }
}

fn duration_seconds(seconds: u64) -> AppResult<chrono::Duration> {
    i64::try_from(seconds)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .ok_or_else(|| AppError::internal(format!("Session lifetime {seconds}s is out of range")))
}
