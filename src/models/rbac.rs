use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// ROLE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            permissions: Vec::new(),
        }
    }

    /// Grants `action` unless the role already carries it.
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        let action = action.into();
        if !self.permissions.iter().any(|p| p.action == action) {
            self.permissions.push(Permission::for_action(action));
        }
        self
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.permissions.iter().map(|p| p.action.as_str())
    }
}

// =============================================================================
// PERMISSION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: Uuid,
    pub name: String,
    pub action: String,
}

impl Permission {
    /// Permission whose display name equals its action, the shape the default
    /// seed data uses.
    pub fn for_action(action: impl Into<String>) -> Self {
        let action = action.into();
        Self {
            id: Uuid::new_v4(),
            name: action.clone(),
            action,
        }
    }
}

// =============================================================================
// GROUP SYNC RESULT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// No group mapped to a role; existing assignments were left untouched.
    Skipped { groups: Vec<String> },
    /// Assignments were replaced with exactly these roles.
    Replaced { role_names: BTreeSet<String> },
}

impl SyncOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, SyncOutcome::Skipped { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_action_ignores_duplicates() {
        let role = Role::new("CoreHubMember")
            .with_action("viewTask")
            .with_action("viewTask")
            .with_action("editTask");

        let actions: Vec<&str> = role.actions().collect();
        assert_eq!(actions, vec!["viewTask", "editTask"]);
    }

    #[test]
    fn sync_outcome_serializes_with_status_tag() {
        let outcome = SyncOutcome::Replaced {
            role_names: BTreeSet::from(["Admin".to_string()]),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "replaced");
        assert_eq!(json["role_names"][0], "Admin");
    }
}
