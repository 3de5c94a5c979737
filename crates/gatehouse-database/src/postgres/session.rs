//! PostgreSQL session store.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use gatehouse_core::result::AppResult;
use gatehouse_core::traits::Repository;
use gatehouse_core::types::ListQuery;
use gatehouse_entity::session::{Session, SessionPatch, SessionStore};

use super::args::{bind_all, db_error};
use crate::query::{self, SESSIONS};

/// Session store for the `sessions` table.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Create a new store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PgSessionStore {
    type Entity = Session;
    type Patch = SessionPatch;

    async fn create(&self, session: &Session) -> AppResult<Session> {
        sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (id, user_id, ip_address, user_agent, is_blocked, expires_at, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING *",
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(&session.ip_address)
        .bind(&session.user_agent)
        .bind(session.is_blocked)
        .bind(session.expires_at)
        .bind(session.created_at)
        .bind(session.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create session"))
    }

    async fn find_by_id(&self, id: &Uuid) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find session by id"))
    }

    async fn update(&self, id: &Uuid, patch: &SessionPatch) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE sessions SET \
             ip_address = COALESCE($2, ip_address), \
             user_agent = COALESCE($3, user_agent), \
             is_blocked = COALESCE($4, is_blocked), \
             expires_at = COALESCE($5, expires_at), \
             updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&patch.ip_address)
        .bind(&patch.user_agent)
        .bind(patch.is_blocked)
        .bind(patch.expires_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update session"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete session"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, list: &ListQuery) -> AppResult<(Vec<Session>, u64)> {
        let translated = query::translate(list, &SESSIONS)?;

        let sql = translated.select_sql(&SESSIONS)?;
        let rows = sqlx::query_as_with::<_, Session, _>(&sql, bind_all(&translated.binds)?)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list sessions"))?;

        let total = if translated.count {
            let sql = translated.count_sql(&SESSIONS)?;
            let total = sqlx::query_scalar_with::<_, i64, _>(&sql, bind_all(&translated.binds)?)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("Failed to count sessions"))?;
            total as u64
        } else {
            0
        };

        Ok((rows, total))
    }

    async fn count(&self, list: &ListQuery) -> AppResult<u64> {
        let translated = query::translate(list, &SESSIONS)?;
        let sql = translated.count_sql(&SESSIONS)?;
        let total = sqlx::query_scalar_with::<_, i64, _>(&sql, bind_all(&translated.binds)?)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count sessions"))?;
        Ok(total as u64)
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn find_active(&self, id: &Uuid, user_id: &Uuid) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE id = $1 AND user_id = $2 AND is_blocked = false",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find active session"))
    }

    async fn delete_expired(&self, user_id: Option<&Uuid>) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM sessions WHERE expires_at < NOW() AND ($1::uuid IS NULL OR user_id = $1)",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to delete expired sessions"))?;
        Ok(result.rows_affected())
    }

    async fn block_all_for_user(&self, user_id: &Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE sessions SET is_blocked = true, updated_at = NOW() \
             WHERE user_id = $1 AND is_blocked = false",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to block sessions"))?;
        Ok(result.rows_affected())
    }

    async fn block_all_for_user_except(&self, user_id: &Uuid, keep: &Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE sessions SET is_blocked = true, updated_at = NOW() \
             WHERE user_id = $1 AND id <> $2 AND is_blocked = false",
        )
        .bind(user_id)
        .bind(keep)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to block superseded sessions"))?;
        Ok(result.rows_affected())
    }
}
