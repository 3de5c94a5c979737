//! Driver selection.

use std::sync::Arc;

use tracing::info;

use gatehouse_core::config::{DatabaseConfig, DatabaseDriver};
use gatehouse_core::result::AppResult;
use gatehouse_entity::session::SessionStore;
use gatehouse_entity::user::UserStore;

use crate::connection::DatabasePool;
use crate::memory::{MemorySessionStore, MemoryUserStore};
use crate::migration::run_migrations;
use crate::postgres::{PgSessionStore, PgUserStore};

/// The store implementations the rest of the application talks to.
#[derive(Clone)]
pub struct Stores {
    /// Identity store.
    pub users: Arc<dyn UserStore>,
    /// Session store.
    pub sessions: Arc<dyn SessionStore>,
    /// The pool, when backed by PostgreSQL.
    pub pool: Option<DatabasePool>,
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl Stores {
    /// Fresh in-memory stores.
    pub fn memory() -> Self {
        Self {
            users: Arc::new(MemoryUserStore::new()),
            sessions: Arc::new(MemorySessionStore::new()),
            pool: None,
        }
    }

    /// Stores over an existing PostgreSQL pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        Self {
            users: Arc::new(PgUserStore::new(pool.pool().clone())),
            sessions: Arc::new(PgSessionStore::new(pool.pool().clone())),
            pool: Some(pool),
        }
    }

    /// Open the configured driver. PostgreSQL is migrated on connect.
    pub async fn open(config: &DatabaseConfig) -> AppResult<Self> {
        match config.driver {
            DatabaseDriver::Memory => {
                info!("Using in-memory store driver");
                Ok(Self::memory())
            }
            DatabaseDriver::Postgres => {
                let pool = DatabasePool::connect(config).await?;
                run_migrations(pool.pool()).await?;
                Ok(Self::postgres(pool))
            }
        }
    }

    /// Whether the backing store is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => pool.health_check().await,
            None => Ok(true),
        }
    }

    /// Release backing resources.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
