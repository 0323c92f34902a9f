use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::RoleStore;
use crate::errors::{AppError, AppResult};
use crate::models::rbac::Role;

#[derive(Debug, Default)]
struct Inner {
    roles: HashMap<Uuid, Role>,
    user_roles: HashMap<String, BTreeSet<Uuid>>,
}

/// Role store kept entirely in memory. Replacements happen under a single
/// write lock so readers see either the old or the new assignment set.
#[derive(Debug, Default)]
pub struct InMemoryRoleStore {
    inner: RwLock<Inner>,
}

impl InMemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `role`, replacing any role with the same id. Returns its id.
    pub async fn insert_role(&self, role: Role) -> Uuid {
        let id = role.id;
        self.inner.write().await.roles.insert(id, role);
        id
    }

    /// Adds a single assignment without touching the user's other roles.
    pub async fn assign_role(&self, user_id: &str, role_id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.roles.contains_key(&role_id) {
            return Err(AppError::invalid_input(format!("unknown role id {role_id}")));
        }
        inner
            .user_roles
            .entry(user_id.to_string())
            .or_default()
            .insert(role_id);
        Ok(())
    }

    /// Names of the roles currently assigned to `user_id`.
    pub async fn role_names_for(&self, user_id: &str) -> BTreeSet<String> {
        let inner = self.inner.read().await;
        inner
            .user_roles
            .get(user_id)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.roles.get(id))
            .map(|role| role.name.clone())
            .collect()
    }
}

#[async_trait]
impl RoleStore for InMemoryRoleStore {
    async fn find_roles_for_user(&self, user_id: &str) -> AppResult<Vec<Role>> {
        let inner = self.inner.read().await;
        let roles = inner
            .user_roles
            .get(user_id)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.roles.get(id).cloned())
            .collect();
        Ok(roles)
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let inner = self.inner.read().await;
        Ok(inner.roles.values().find(|role| role.name == name).cloned())
    }

    async fn replace_user_roles(&self, user_id: &str, role_ids: &[Uuid]) -> AppResult<()> {
        let mut inner = self.inner.write().await;

        // Validate everything before touching the existing assignment.
        if let Some(missing) = role_ids.iter().find(|id| !inner.roles.contains_key(*id)) {
            return Err(AppError::invalid_input(format!("unknown role id {missing}")));
        }

        let replacement: BTreeSet<Uuid> = role_ids.iter().copied().collect();
        if replacement.is_empty() {
            inner.user_roles.remove(user_id);
        } else {
            inner.user_roles.insert(user_id.to_string(), replacement);
        }
        Ok(())
    }
}
