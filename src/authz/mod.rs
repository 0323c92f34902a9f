//! Authorization module - task access evaluation
//!
//! Decisions combine three inputs:
//! - task ownership
//! - the task's privacy flag
//! - role overlap between the requester and the task owner
//!
//! Public tasks are open to everyone. Private tasks are reachable by the
//! owner, admins, and anyone sharing a role with the owner, and each action
//! is further gated on the requester's permission actions.

mod evaluator;
mod principal;

pub use evaluator::{DefaultPolicyEvaluator, PolicyEvaluator};
pub use principal::{resolve_user_roles_and_permissions, Principal};

/// Well-known role names
pub mod roles {
    pub const ADMIN: &str = "Admin";
    pub const CORE_HUB_MEMBER: &str = "CoreHubMember";
    pub const PROF_SERVICES_MEMBER: &str = "ProfServicesMember";

    pub const ALL: [&str; 3] = [ADMIN, CORE_HUB_MEMBER, PROF_SERVICES_MEMBER];
}

/// Well-known permission actions
pub mod permissions {
    pub const VIEW_TASK: &str = "viewTask";
    pub const EDIT_TASK: &str = "editTask";
    pub const DELETE_TASK: &str = "deleteTask";

    pub const ALL: [&str; 3] = [VIEW_TASK, EDIT_TASK, DELETE_TASK];
}
