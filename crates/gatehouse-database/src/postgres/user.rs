//! PostgreSQL identity store.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::traits::Repository;
use gatehouse_core::types::ListQuery;
use gatehouse_entity::user::{User, UserPatch, UserStore};

use super::args::{bind_all, db_error, is_unique_violation};
use crate::query::{self, USERS};

/// Identity store for the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn conflict_or(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        if is_unique_violation(&e) {
            AppError::conflict("Email or phone number is already registered").caused_by(e)
        } else {
            db_error(context)(e)
        }
    }
}

#[async_trait]
impl Repository for PgUserStore {
    type Entity = User;
    type Patch = UserPatch;

    async fn create(&self, user: &User) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, phone, first_name, last_name, password_hash, role, \
             status, last_login_at, refresh_token, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING *",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.status)
        .bind(user.last_login_at)
        .bind(&user.refresh_token)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_or("Failed to create user"))
    }

    async fn find_by_id(&self, id: &Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by id"))
    }

    async fn update(&self, id: &Uuid, patch: &UserPatch) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET \
             email = COALESCE($2, email), \
             phone = CASE WHEN $3::text IS NULL THEN phone ELSE NULLIF($3, '') END, \
             first_name = COALESCE($4, first_name), \
             last_name = COALESCE($5, last_name), \
             password_hash = COALESCE($6, password_hash), \
             role = COALESCE($7, role), \
             status = COALESCE($8, status), \
             last_login_at = COALESCE($9, last_login_at), \
             refresh_token = COALESCE($10, refresh_token), \
             updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&patch.email)
        .bind(&patch.phone)
        .bind(&patch.first_name)
        .bind(&patch.last_name)
        .bind(&patch.password_hash)
        .bind(&patch.role)
        .bind(patch.status)
        .bind(patch.last_login_at)
        .bind(&patch.refresh_token)
        .execute(&self.pool)
        .await
        .map_err(conflict_or("Failed to update user"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete user"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, list: &ListQuery) -> AppResult<(Vec<User>, u64)> {
        let translated = query::translate(list, &USERS)?;

        let sql = translated.select_sql(&USERS)?;
        let rows = sqlx::query_as_with::<_, User, _>(&sql, bind_all(&translated.binds)?)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list users"))?;

        let total = if translated.count {
            let sql = translated.count_sql(&USERS)?;
            let total = sqlx::query_scalar_with::<_, i64, _>(&sql, bind_all(&translated.binds)?)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("Failed to count users"))?;
            total as u64
        } else {
            0
        };

        Ok((rows, total))
    }

    async fn count(&self, list: &ListQuery) -> AppResult<u64> {
        let translated = query::translate(list, &USERS)?;
        let sql = translated.count_sql(&USERS)?;
        let total = sqlx::query_scalar_with::<_, i64, _>(&sql, bind_all(&translated.binds)?)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count users"))?;
        Ok(total as u64)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email = $1 AND status <> 'deleted' LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find user by email"))
    }
}
