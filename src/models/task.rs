use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// The task attributes access evaluation depends on. Callers load the task
/// from their own store and hand this over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSubject {
    pub owner_id: String,
    #[serde(default)]
    pub is_private: bool,
}

impl TaskSubject {
    pub fn public(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            is_private: false,
        }
    }

    pub fn private(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            is_private: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAction {
    View,
    Edit,
    Delete,
    TogglePrivacy,
}

impl TaskAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskAction::View => "view",
            TaskAction::Edit => "edit",
            TaskAction::Delete => "delete",
            TaskAction::TogglePrivacy => "toggle_privacy",
        }
    }
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-request access decision for one task. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_toggle_privacy: bool,
}

impl AccessDecision {
    pub fn deny_all() -> Self {
        Self::default()
    }

    pub fn allows(&self, action: TaskAction) -> bool {
        match action {
            TaskAction::View => self.can_view,
            TaskAction::Edit => self.can_edit,
            TaskAction::Delete => self.can_delete,
            TaskAction::TogglePrivacy => self.can_toggle_privacy,
        }
    }

    pub fn require(&self, action: TaskAction) -> AppResult<()> {
        if self.allows(action) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!("not allowed to {action} this task")))
        }
    }

    pub fn is_denied(&self) -> bool {
        *self == Self::deny_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_maps_denial_to_forbidden() {
        let decision = AccessDecision {
            can_view: true,
            ..AccessDecision::deny_all()
        };

        assert!(decision.require(TaskAction::View).is_ok());
        let err = decision.require(TaskAction::Delete).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(err.to_string(), "forbidden: not allowed to delete this task");
    }

    #[test]
    fn deny_all_is_denied() {
        assert!(AccessDecision::deny_all().is_denied());
        assert!(!AccessDecision { can_toggle_privacy: true, ..Default::default() }.is_denied());
    }

    #[test]
    fn task_subject_defaults_to_public() {
        let task: TaskSubject = serde_json::from_str(r#"{"owner_id":"ada"}"#).unwrap();
        assert_eq!(task, TaskSubject::public("ada"));
    }
}
