//! Application state shared across all handlers.

use std::sync::Arc;

use gatehouse_auth::{
    PasswordHasher, PasswordValidator, PolicySet, RbacEnforcer, SessionManager, TokenService,
};
use gatehouse_core::config::AppConfig;
use gatehouse_core::result::AppResult;
use gatehouse_database::Stores;

/// Shared dependencies, passed to every handler via `State<AppState>`.
///
/// All fields are cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Identity and session stores.
    pub stores: Stores,
    /// Token issuance and verification.
    pub tokens: Arc<TokenService>,
    /// Login, refresh and revocation.
    pub session_manager: Arc<SessionManager>,
    /// Permission engine.
    pub rbac: Arc<RbacEnforcer>,
    /// Argon2id hasher.
    pub password_hasher: PasswordHasher,
    /// Strength policy for new passwords.
    pub password_validator: Arc<PasswordValidator>,
}

impl AppState {
    /// Wire the auth components over the given stores.
    ///
    /// Fails when the token algorithm or the configured RBAC graph is
    /// invalid.
    pub fn new(config: AppConfig, stores: Stores) -> AppResult<Self> {
        let tokens = Arc::new(TokenService::new(&config.auth)?);
        let policies = PolicySet::from_config(&config.rbac)?;

        let session_manager = Arc::new(SessionManager::new(
            Arc::clone(&stores.users),
            Arc::clone(&stores.sessions),
            Arc::clone(&tokens),
            config.auth.clone(),
            config.session.clone(),
        ));

        Ok(Self {
            password_validator: Arc::new(PasswordValidator::new(&config.auth)),
            rbac: Arc::new(RbacEnforcer::new(policies)),
            password_hasher: PasswordHasher::new(),
            session_manager,
            tokens,
            stores,
            config: Arc::new(config),
        })
    }
}
