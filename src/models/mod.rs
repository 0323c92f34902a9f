pub mod rbac;
pub mod task;
