//! In-memory identity store.

use async_trait::async_trait;
use uuid::Uuid;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::traits::Repository;
use gatehouse_core::types::ListQuery;
use gatehouse_entity::user::{User, UserPatch, UserStatus, UserStore};

use super::table::MemoryTable;
use crate::query::USERS;

/// Identity store backed by process memory.
#[derive(Debug)]
pub struct MemoryUserStore {
    table: MemoryTable<User>,
}

impl MemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            table: MemoryTable::new(USERS),
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject an email or phone already used by another non-deleted identity.
fn ensure_unique<'a>(
    mut others: impl Iterator<Item = &'a User>,
    email: &str,
    phone: Option<&str>,
) -> AppResult<()> {
    let clash = others.find(|u| {
        u.status != UserStatus::Deleted
            && (u.email == email || (phone.is_some() && u.phone.as_deref() == phone))
    });
    match clash {
        Some(u) if u.email == email => Err(AppError::conflict(format!(
            "Email '{email}' is already registered"
        ))),
        Some(_) => Err(AppError::conflict("Phone number is already registered")),
        None => Ok(()),
    }
}

#[async_trait]
impl Repository for MemoryUserStore {
    type Entity = User;
    type Patch = UserPatch;

    async fn create(&self, user: &User) -> AppResult<User> {
        let mut rows = self.table.write().await;
        if rows.contains_key(&user.id) {
            return Err(AppError::conflict(format!("User {} already exists", user.id)));
        }
        ensure_unique(rows.values(), &user.email, user.phone.as_deref())?;
        rows.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: &Uuid) -> AppResult<Option<User>> {
        Ok(self.table.read().await.get(id).cloned())
    }

    async fn update(&self, id: &Uuid, patch: &UserPatch) -> AppResult<bool> {
        let mut rows = self.table.write().await;
        let Some(current) = rows.get(id) else {
            return Ok(false);
        };

        let mut updated = current.clone();
        patch.apply_to(&mut updated);
        if updated.status != UserStatus::Deleted {
            ensure_unique(
                rows.values().filter(|u| u.id != *id),
                &updated.email,
                updated.phone.as_deref(),
            )?;
        }
        rows.insert(*id, updated);
        Ok(true)
    }

    async fn delete(&self, id: &Uuid) -> AppResult<bool> {
        Ok(self.table.write().await.remove(id).is_some())
    }

    async fn list(&self, query: &ListQuery) -> AppResult<(Vec<User>, u64)> {
        self.table.list(query).await
    }

    async fn count(&self, query: &ListQuery) -> AppResult<u64> {
        self.table.count(query).await
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .table
            .read()
            .await
            .values()
            .find(|u| u.email == email && u.status != UserStatus::Deleted)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use gatehouse_core::error::ErrorKind;
    use gatehouse_core::types::FilterPayload;

    use super::*;

    fn user(email: &str, role: &str) -> User {
        User::new(email, None, "First", "Last", "hash", role)
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryUserStore::new();
        store.create(&user("a@x.sky", "admin")).await.unwrap();
        let err = store.create(&user("A@X.SKY", "user")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_deleted_identity_frees_email() {
        let store = MemoryUserStore::new();
        let first = store.create(&user("a@x.sky", "user")).await.unwrap();
        let patch = UserPatch {
            status: Some(UserStatus::Deleted),
            ..Default::default()
        };
        assert!(store.update(&first.id, &patch).await.unwrap());
        assert!(store.find_by_email("a@x.sky").await.unwrap().is_none());

        store.create(&user("a@x.sky", "user")).await.unwrap();
        assert!(store.find_by_email("a@x.sky").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_filters_by_role() {
        let store = MemoryUserStore::new();
        store.create(&user("a@x.sky", "admin")).await.unwrap();
        store.create(&user("b@x.sky", "user")).await.unwrap();
        store.create(&user("c@x.sky", "admin")).await.unwrap();

        let query = ListQuery::new(1, 1)
            .with_sort("-email")
            .with_filter(FilterPayload::parse(r#"{"role":"admin"}"#).unwrap());
        let (rows, total) = store.list(&query).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].email, "c@x.sky");
    }
}
