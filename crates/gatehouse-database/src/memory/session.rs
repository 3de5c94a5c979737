//! In-memory session store.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::traits::Repository;
use gatehouse_core::types::ListQuery;
use gatehouse_entity::session::{Session, SessionPatch, SessionStore};

use super::table::MemoryTable;
use crate::query::SESSIONS;

/// Session store backed by process memory.
#[derive(Debug)]
pub struct MemorySessionStore {
    table: MemoryTable<Session>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            table: MemoryTable::new(SESSIONS),
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository for MemorySessionStore {
    type Entity = Session;
    type Patch = SessionPatch;

    async fn create(&self, session: &Session) -> AppResult<Session> {
        let mut rows = self.table.write().await;
        if rows.contains_key(&session.id) {
            return Err(AppError::conflict(format!(
                "Session {} already exists",
                session.id
            )));
        }
        rows.insert(session.id, session.clone());
        Ok(session.clone())
    }

    async fn find_by_id(&self, id: &Uuid) -> AppResult<Option<Session>> {
        Ok(self.table.read().await.get(id).cloned())
    }

    async fn update(&self, id: &Uuid, patch: &SessionPatch) -> AppResult<bool> {
        let mut rows = self.table.write().await;
        match rows.get_mut(id) {
            Some(session) => {
                patch.apply_to(session);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &Uuid) -> AppResult<bool> {
        Ok(self.table.write().await.remove(id).is_some())
    }

    async fn list(&self, query: &ListQuery) -> AppResult<(Vec<Session>, u64)> {
        self.table.list(query).await
    }

    async fn count(&self, query: &ListQuery) -> AppResult<u64> {
        self.table.count(query).await
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn find_active(&self, id: &Uuid, user_id: &Uuid) -> AppResult<Option<Session>> {
        Ok(self
            .table
            .read()
            .await
            .get(id)
            .filter(|s| s.user_id == *user_id && !s.is_blocked)
            .cloned())
    }

    async fn delete_expired(&self, user_id: Option<&Uuid>) -> AppResult<u64> {
        let now = Utc::now();
        let mut rows = self.table.write().await;
        let before = rows.len();
        rows.retain(|_, s| !(s.expires_at < now && user_id.is_none_or(|uid| s.user_id == *uid)));
        Ok((before - rows.len()) as u64)
    }

    async fn block_all_for_user(&self, user_id: &Uuid) -> AppResult<u64> {
        let mut rows = self.table.write().await;
        let mut blocked = 0;
        for session in rows.values_mut() {
            if session.user_id == *user_id && !session.is_blocked {
                SessionPatch::block().apply_to(session);
                blocked += 1;
            }
        }
        Ok(blocked)
    }

    async fn block_all_for_user_except(&self, user_id: &Uuid, keep: &Uuid) -> AppResult<u64> {
        let mut rows = self.table.write().await;
        let mut blocked = 0;
        for session in rows.values_mut() {
            if session.user_id == *user_id && session.id != *keep && !session.is_blocked {
                SessionPatch::block().apply_to(session);
                blocked += 1;
            }
        }
        Ok(blocked)
    }
}
