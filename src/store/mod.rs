//! Role Store contract.
//!
//! The store owns users' role assignments and each role's permission set.
//! Access evaluation only reads through it; group sync is the only writer
//! and goes through [`RoleStore::replace_user_roles`].

mod memory;

pub use memory::InMemoryRoleStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppResult;
use crate::models::rbac::Role;

#[async_trait]
pub trait RoleStore: Send + Sync {
    /// All roles assigned to `user_id`, each with its permissions. Unknown
    /// users yield an empty list.
    async fn find_roles_for_user(&self, user_id: &str) -> AppResult<Vec<Role>>;

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// Replaces every assignment of `user_id` with `role_ids` as one
    /// all-or-nothing operation. On error the previous assignments remain.
    async fn replace_user_roles(&self, user_id: &str, role_ids: &[Uuid]) -> AppResult<()>;
}
