use std::sync::Arc;

use async_trait::async_trait;

use super::permissions::{DELETE_TASK, EDIT_TASK, VIEW_TASK};
use super::principal::{resolve_user_roles_and_permissions, Principal};
use crate::errors::AppResult;
use crate::models::task::{AccessDecision, TaskSubject};
use crate::store::RoleStore;
use crate::utils::require_user_id;

/// Policy evaluator trait for pluggable task authorization logic
#[async_trait]
pub trait PolicyEvaluator: Send + Sync {
    /// Decide what `requesting_user_id` may do with `task`
    async fn evaluate_task_access(
        &self,
        requesting_user_id: &str,
        task: &TaskSubject,
    ) -> AppResult<AccessDecision>;
}

/// Default evaluator over a [`RoleStore`]
///
/// Evaluation order:
/// 1. public task -> view/edit/delete allowed, toggle for owner or admin
/// 2. private task -> access for owner, admin, or shared role with owner
/// 3. each action on a private task additionally needs its permission
#[derive(Clone)]
pub struct DefaultPolicyEvaluator {
    store: Arc<dyn RoleStore>,
}

impl DefaultPolicyEvaluator {
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self { store }
    }

    pub async fn resolve_user_roles_and_permissions(&self, user_id: &str) -> AppResult<Principal> {
        resolve_user_roles_and_permissions(self.store.as_ref(), user_id).await
    }

    fn private_decision(requester: &Principal, can_access: bool) -> AccessDecision {
        AccessDecision {
            can_view: can_access && requester.has_permission(VIEW_TASK),
            can_edit: can_access && requester.has_permission(EDIT_TASK),
            can_delete: can_access && requester.has_permission(DELETE_TASK),
            can_toggle_privacy: can_access,
        }
    }
}

#[async_trait]
impl PolicyEvaluator for DefaultPolicyEvaluator {
    async fn evaluate_task_access(
        &self,
        requesting_user_id: &str,
        task: &TaskSubject,
    ) -> AppResult<AccessDecision> {
        let requesting_user_id = require_user_id(requesting_user_id, "requesting_user_id")?;
        let owner_id = require_user_id(&task.owner_id, "task.owner_id")?;

        let is_owner = owner_id == requesting_user_id;
        let requester = self.resolve_user_roles_and_permissions(requesting_user_id).await?;
        let is_admin = requester.is_admin();

        if !task.is_private {
            tracing::debug!(
                user_id = %requesting_user_id,
                is_owner,
                is_admin,
                "public task"
            );
            return Ok(AccessDecision {
                can_view: true,
                can_edit: true,
                can_delete: true,
                can_toggle_privacy: is_owner || is_admin,
            });
        }

        // The owner is resolved independently, even when it is the requester.
        let owner = self.resolve_user_roles_and_permissions(owner_id).await?;
        let shares_role_with_owner = requester.shares_role_with(&owner);
        let can_access = is_owner || is_admin || shares_role_with_owner;

        let decision = Self::private_decision(&requester, can_access);
        tracing::debug!(
            user_id = %requesting_user_id,
            owner_id = %owner_id,
            is_owner,
            is_admin,
            shares_role_with_owner,
            decision = ?decision,
            "private task"
        );

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use uuid::Uuid;

    use super::*;
    use crate::authz::roles::{ADMIN, CORE_HUB_MEMBER, PROF_SERVICES_MEMBER};
    use crate::errors::AppError;
    use crate::models::rbac::Role;
    use crate::store::InMemoryRoleStore;

    async fn store_with(assignments: &[(&str, Role)]) -> Arc<InMemoryRoleStore> {
        let store = Arc::new(InMemoryRoleStore::new());
        for (user, role) in assignments {
            let id = match store.find_role_by_name(&role.name).await.unwrap() {
                Some(existing) => existing.id,
                None => store.insert_role(role.clone()).await,
            };
            store.assign_role(user, id).await.unwrap();
        }
        store
    }

    fn hub_viewer_editor() -> Role {
        Role::new(CORE_HUB_MEMBER).with_action(VIEW_TASK).with_action(EDIT_TASK)
    }

    fn full(name: &str) -> Role {
        Role::new(name)
            .with_action(VIEW_TASK)
            .with_action(EDIT_TASK)
            .with_action(DELETE_TASK)
    }

    #[tokio::test]
    async fn public_task_is_open_to_everyone() {
        let store = store_with(&[]).await;
        let evaluator = DefaultPolicyEvaluator::new(store);

        let decision = evaluator
            .evaluate_task_access("stranger", &TaskSubject::public("ada"))
            .await
            .unwrap();

        assert!(decision.can_view && decision.can_edit && decision.can_delete);
        assert!(!decision.can_toggle_privacy);
    }

    #[tokio::test]
    async fn public_task_toggle_needs_owner_or_admin() {
        let store = store_with(&[("root", Role::new(ADMIN))]).await;
        let evaluator = DefaultPolicyEvaluator::new(store);
        let task = TaskSubject::public("ada");

        let owner = evaluator.evaluate_task_access("ada", &task).await.unwrap();
        let admin = evaluator.evaluate_task_access("root", &task).await.unwrap();
        let other = evaluator.evaluate_task_access("bob", &task).await.unwrap();

        assert!(owner.can_toggle_privacy);
        assert!(admin.can_toggle_privacy);
        assert!(!other.can_toggle_privacy);
    }

    #[tokio::test]
    async fn owner_with_partial_permissions_on_private_task() {
        let store = store_with(&[("ada", hub_viewer_editor())]).await;
        let evaluator = DefaultPolicyEvaluator::new(store);

        let decision = evaluator
            .evaluate_task_access("ada", &TaskSubject::private("ada"))
            .await
            .unwrap();

        assert_eq!(
            decision,
            AccessDecision {
                can_view: true,
                can_edit: true,
                can_delete: false,
                can_toggle_privacy: true,
            }
        );
    }

    #[tokio::test]
    async fn ownership_alone_grants_no_actions_on_private_task() {
        let store = store_with(&[]).await;
        let evaluator = DefaultPolicyEvaluator::new(store);

        let decision = evaluator
            .evaluate_task_access("ada", &TaskSubject::private("ada"))
            .await
            .unwrap();

        assert!(!decision.can_view && !decision.can_edit && !decision.can_delete);
        assert!(decision.can_toggle_privacy);
    }

    #[tokio::test]
    async fn unrelated_user_is_denied_private_task() {
        let store = store_with(&[
            ("ada", full(CORE_HUB_MEMBER)),
            ("bob", full(PROF_SERVICES_MEMBER)),
        ])
        .await;
        let evaluator = DefaultPolicyEvaluator::new(store);

        let decision = evaluator
            .evaluate_task_access("bob", &TaskSubject::private("ada"))
            .await
            .unwrap();

        assert!(decision.is_denied());
    }

    #[tokio::test]
    async fn shared_role_opens_private_task() {
        let store = store_with(&[("ada", hub_viewer_editor()), ("bob", hub_viewer_editor())]).await;
        let evaluator = DefaultPolicyEvaluator::new(store);

        let decision = evaluator
            .evaluate_task_access("bob", &TaskSubject::private("ada"))
            .await
            .unwrap();

        assert!(decision.can_view && decision.can_edit && decision.can_toggle_privacy);
        assert!(!decision.can_delete);
    }

    #[tokio::test]
    async fn admin_actions_follow_admin_permissions() {
        let store = store_with(&[
            ("ada", full(CORE_HUB_MEMBER)),
            ("root", Role::new(ADMIN).with_action(VIEW_TASK)),
        ])
        .await;
        let evaluator = DefaultPolicyEvaluator::new(store);

        let decision = evaluator
            .evaluate_task_access("root", &TaskSubject::private("ada"))
            .await
            .unwrap();

        assert_eq!(
            decision,
            AccessDecision {
                can_view: true,
                can_edit: false,
                can_delete: false,
                can_toggle_privacy: true,
            }
        );
    }

    #[tokio::test]
    async fn blank_ids_are_invalid_input() {
        let evaluator = DefaultPolicyEvaluator::new(store_with(&[]).await);

        let err = evaluator
            .evaluate_task_access("", &TaskSubject::private("ada"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err = evaluator
            .evaluate_task_access("ada", &TaskSubject::private(" "))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn ids_differing_in_whitespace_are_different_users() {
        let store = store_with(&[("ada", hub_viewer_editor())]).await;
        let evaluator = DefaultPolicyEvaluator::new(store);

        let public = evaluator
            .evaluate_task_access("ada", &TaskSubject::public(" ada "))
            .await
            .unwrap();
        assert!(!public.can_toggle_privacy);

        let private = evaluator
            .evaluate_task_access("ada", &TaskSubject::private(" ada "))
            .await
            .unwrap();
        assert!(private.is_denied());
    }

    /// Counts lookups per user and can be told to fail every read.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryRoleStore,
        lookups: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl RoleStore for CountingStore {
        async fn find_roles_for_user(&self, user_id: &str) -> AppResult<Vec<Role>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::StoreUnavailable(sqlx::Error::PoolTimedOut));
            }
            self.inner.find_roles_for_user(user_id).await
        }

        async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
            self.inner.find_role_by_name(name).await
        }

        async fn replace_user_roles(&self, user_id: &str, role_ids: &[Uuid]) -> AppResult<()> {
            self.inner.replace_user_roles(user_id, role_ids).await
        }
    }

    #[tokio::test]
    async fn private_task_resolves_owner_separately() {
        let store = Arc::new(CountingStore::default());
        let evaluator = DefaultPolicyEvaluator::new(store.clone());

        evaluator
            .evaluate_task_access("ada", &TaskSubject::private("ada"))
            .await
            .unwrap();
        assert_eq!(store.lookups.load(Ordering::SeqCst), 2);

        evaluator
            .evaluate_task_access("ada", &TaskSubject::public("ada"))
            .await
            .unwrap();
        assert_eq!(store.lookups.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn store_failures_propagate() {
        let store = Arc::new(CountingStore {
            fail: true,
            ..CountingStore::default()
        });
        let evaluator = DefaultPolicyEvaluator::new(store);

        let err = evaluator
            .evaluate_task_access("ada", &TaskSubject::public("ada"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }
}
