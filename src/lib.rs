pub mod authz;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod store;
pub mod sync;
pub mod utils;

// Re-export the public surface used by the CLI and by callers
pub use authz::{DefaultPolicyEvaluator, PolicyEvaluator, Principal};
pub use config::{AppConfig, GroupRoleMapping};
pub use errors::{AppError, AppResult};
pub use models::rbac::{Permission, Role, SyncOutcome};
pub use models::task::{AccessDecision, TaskAction, TaskSubject};
pub use store::{InMemoryRoleStore, RoleStore};
pub use sync::RoleSync;
