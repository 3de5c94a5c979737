//! Generic repository trait for data access.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::pagination::ListQuery;

/// Generic CRUD repository contract.
///
/// Each entity gets a strongly typed implementation; entity-specific
/// lookups live on extension traits next to the entity. Every call is a
/// single round-trip and is cancelled when the calling future is dropped.
#[async_trait]
pub trait Repository: Send + Sync + 'static {
    /// The stored record.
    type Entity: Send + Sync + 'static;
    /// Partial update applied by [`Repository::update`].
    type Patch: Send + Sync + 'static;

    /// Insert a new record and return it as stored.
    async fn create(&self, entity: &Self::Entity) -> AppResult<Self::Entity>;

    /// Find a record by its primary key.
    async fn find_by_id(&self, id: &uuid::Uuid) -> AppResult<Option<Self::Entity>>;

    /// Apply a partial update to the record matching `id`.
    /// Returns `false` when nothing matched.
    async fn update(&self, id: &uuid::Uuid, patch: &Self::Patch) -> AppResult<bool>;

    /// Delete the record matching `id`. Returns `true` if deleted.
    async fn delete(&self, id: &uuid::Uuid) -> AppResult<bool>;

    /// Return one page of records plus the total matching count
    /// (`0` when counting was not requested).
    async fn list(&self, query: &ListQuery) -> AppResult<(Vec<Self::Entity>, u64)>;

    /// Count records matching the query's filter.
    async fn count(&self, query: &ListQuery) -> AppResult<u64>;
}
