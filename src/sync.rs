//! Identity-provider group to role synchronization.

use std::collections::BTreeSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::config::GroupRoleMapping;
use crate::errors::AppResult;
use crate::models::rbac::SyncOutcome;
use crate::store::RoleStore;
use crate::utils::require_user_id;

#[derive(Clone)]
pub struct RoleSync {
    store: Arc<dyn RoleStore>,
    mapping: GroupRoleMapping,
}

impl RoleSync {
    pub fn new(store: Arc<dyn RoleStore>, mapping: GroupRoleMapping) -> Self {
        Self { store, mapping }
    }

    /// Replaces `user_id`'s roles with the roles its groups map to.
    ///
    /// When no group maps to a role the user's current roles are kept. Mapped
    /// role names missing from the store are skipped.
    pub async fn sync_user_roles<S: AsRef<str>>(&self, user_id: &str, groups: &[S]) -> AppResult<SyncOutcome> {
        let user_id = require_user_id(user_id, "user_id")?;
        let role_names = self.mapping.map_groups(groups);

        if role_names.is_empty() {
            let groups: Vec<String> = groups.iter().map(|g| g.as_ref().to_string()).collect();
            tracing::warn!(user_id = %user_id, groups = ?groups, "no roles mapped for user groups, keeping existing roles");
            return Ok(SyncOutcome::Skipped { groups });
        }

        let mut role_ids: Vec<Uuid> = Vec::with_capacity(role_names.len());
        let mut resolved = BTreeSet::new();
        for name in &role_names {
            match self.store.find_role_by_name(name).await? {
                Some(role) => {
                    role_ids.push(role.id);
                    resolved.insert(role.name);
                }
                None => tracing::debug!(user_id = %user_id, role = %name, "mapped role not found, skipping"),
            }
        }

        if resolved.is_empty() {
            tracing::warn!(user_id = %user_id, roles = ?role_names, "none of the mapped roles exist, clearing assignments");
        }

        self.store.replace_user_roles(user_id, &role_ids).await?;
        tracing::info!(user_id = %user_id, roles = ?resolved, "synced roles");

        Ok(SyncOutcome::Replaced { role_names: resolved })
    }
}
