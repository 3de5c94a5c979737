//! Identity store contract.

use async_trait::async_trait;

use gatehouse_core::result::AppResult;
use gatehouse_core::traits::Repository;

use super::model::{User, UserPatch};

/// Identity persistence as seen by the auth layer.
///
/// `create` and `update` fail with `Conflict` when the email or phone
/// is already taken by a non-deleted identity.
#[async_trait]
pub trait UserStore: Repository<Entity = User, Patch = UserPatch> {
    /// Find the non-deleted identity with this normalized email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
}
