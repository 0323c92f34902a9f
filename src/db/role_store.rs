use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::row_parsers;
use crate::errors::AppResult;
use crate::models::rbac::Role;
use crate::store::RoleStore;
use crate::utils::utc_now;

const ROLE_GRANTS_SELECT: &str = r#"
    SELECT r.id AS role_id, r.name AS role_name, r.description AS role_description,
           p.id AS permission_id, p.name AS permission_name, p.action AS permission_action
    FROM roles r
    LEFT JOIN role_permissions rp ON rp.role_id = r.id
    LEFT JOIN permissions p ON p.id = rp.permission_id
"#;

/// Role store backed by the `roles`, `permissions`, `role_permissions` and
/// `user_roles` tables.
#[derive(Debug, Clone)]
pub struct SqliteRoleStore {
    pool: SqlitePool,
}

impl SqliteRoleStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for SqliteRoleStore {
    async fn find_roles_for_user(&self, user_id: &str) -> AppResult<Vec<Role>> {
        let sql = format!(
            "{ROLE_GRANTS_SELECT} INNER JOIN user_roles ur ON ur.role_id = r.id WHERE ur.user_id = ? ORDER BY r.name, p.action"
        );

        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        row_parsers::roles_from_joined_rows(&rows)
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let sql = format!("{ROLE_GRANTS_SELECT} WHERE r.name = ? ORDER BY p.action");

        let rows = sqlx::query(&sql)
            .bind(name)
            .fetch_all(&self.pool)
            .await?;

        Ok(row_parsers::roles_from_joined_rows(&rows)?.into_iter().next())
    }

    async fn replace_user_roles(&self, user_id: &str, role_ids: &[Uuid]) -> AppResult<()> {
        let now = utc_now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for role_id in role_ids {
            sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role_id, created_at) VALUES (?, ?, ?)")
                .bind(user_id)
                .bind(role_id.to_string())
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        // Dropping `tx` on an early return rolls the delete back.
        tx.commit().await?;

        Ok(())
    }
}
