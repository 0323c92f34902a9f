use std::collections::HashSet;

use serde::Serialize;

use crate::errors::AppResult;
use crate::store::RoleStore;
use crate::utils::require_user_id;

/// A user together with the role names and permission actions they hold
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: String,
    pub roles: HashSet<String>,
    pub permissions: HashSet<String>,
}

impl Principal {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(super::roles::ADMIN)
    }

    pub fn shares_role_with(&self, other: &Principal) -> bool {
        !self.roles.is_disjoint(&other.roles)
    }

    /// Role and permission names in stable order, for display.
    pub fn sorted(&self) -> (Vec<&str>, Vec<&str>) {
        let mut roles: Vec<&str> = self.roles.iter().map(String::as_str).collect();
        let mut permissions: Vec<&str> = self.permissions.iter().map(String::as_str).collect();
        roles.sort_unstable();
        permissions.sort_unstable();
        (roles, permissions)
    }
}

/// Loads `user_id`'s roles and flattens their permissions into one set.
///
/// Unknown users resolve to an empty principal. Only a blank id is an error.
pub async fn resolve_user_roles_and_permissions(
    store: &dyn RoleStore,
    user_id: &str,
) -> AppResult<Principal> {
    let user_id = require_user_id(user_id, "user_id")?;
    let assigned = store.find_roles_for_user(user_id).await?;

    let mut principal = Principal::new(user_id);
    for role in assigned {
        principal
            .permissions
            .extend(role.actions().map(str::to_string));
        principal.roles.insert(role.name);
    }

    tracing::debug!(
        user_id = %principal.user_id,
        roles = principal.roles.len(),
        permissions = principal.permissions.len(),
        "resolved principal"
    );

    Ok(principal)
}
