//! Session store contract.

use async_trait::async_trait;
use uuid::Uuid;

use gatehouse_core::result::AppResult;
use gatehouse_core::traits::Repository;

use super::model::{Session, SessionPatch};

/// Session persistence as seen by the session lifecycle manager.
#[async_trait]
pub trait SessionStore: Repository<Entity = Session, Patch = SessionPatch> {
    /// Find a non-blocked session matching both ids. Expired sessions are
    /// still returned so the caller can revoke them.
    async fn find_active(&self, id: &Uuid, user_id: &Uuid) -> AppResult<Option<Session>>;

    /// Delete sessions whose expiry is in the past, for one identity or
    /// for all of them. Returns the number of deleted rows.
    async fn delete_expired(&self, user_id: Option<&Uuid>) -> AppResult<u64>;

    /// Block every non-blocked session of an identity. Returns the number
    /// of sessions blocked.
    async fn block_all_for_user(&self, user_id: &Uuid) -> AppResult<u64>;

    /// Block every non-blocked session of an identity except `keep`, as one
    /// atomic step. Used after creating a new session to supersede the rest.
    async fn block_all_for_user_except(&self, user_id: &Uuid, keep: &Uuid) -> AppResult<u64>;
}
