//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod rbac;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::database::{DatabaseConfig, DatabaseDriver};
pub use self::logging::LoggingConfig;
pub use self::rbac::RbacConfig;
pub use self::session::SessionConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for the merged TOML configuration
/// files (default.toml + environment overlay + `GATEHOUSE__*` variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Session management settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Extra RBAC policies merged into the built-in set.
    #[serde(default)]
    pub rbac: RbacConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default`, the environment-specific overlay
    /// `config/{env}` and environment variables prefixed with `GATEHOUSE__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::build(
            config::Config::builder()
                .add_source(config::File::with_name("config/default").required(false))
                .add_source(config::File::with_name(&format!("config/{env}")).required(false)),
        )
    }

    /// Load configuration from an explicit file path plus the environment.
    pub fn load_from(path: &str) -> Result<Self, AppError> {
        Self::build(config::Config::builder().add_source(config::File::with_name(path)))
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, AppError> {
        let config = builder
            .add_source(
                config::Environment::with_prefix("GATEHOUSE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build config: {e}")).caused_by(e))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::internal(format!("Failed to deserialize config: {e}")).caused_by(e))
    }
}
