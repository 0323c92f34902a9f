use sqlx::SqlitePool;
use uuid::Uuid;

use crate::authz::{permissions, roles};
use crate::errors::AppResult;
use crate::utils::utc_now;

/// Creates the well-known roles and task permissions and grants every
/// permission to every role. Safe to run repeatedly.
pub async fn seed_default_rbac(pool: &SqlitePool) -> AppResult<()> {
    let now = utc_now();
    let mut tx = pool.begin().await?;

    for name in roles::ALL {
        sqlx::query(
            "INSERT OR IGNORE INTO roles (id, name, description, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .bind(Option::<String>::None)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    for action in permissions::ALL {
        sqlx::query(
            "INSERT OR IGNORE INTO permissions (id, name, action, description, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(action)
        .bind(action)
        .bind(Option::<String>::None)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    for name in roles::ALL {
        for action in permissions::ALL {
            sqlx::query(
                r#"
                INSERT OR IGNORE INTO role_permissions (role_id, permission_id, created_at)
                SELECT r.id, p.id, ? FROM roles r, permissions p
                WHERE r.name = ? AND p.name = ?
                "#,
            )
            .bind(now)
            .bind(name)
            .bind(action)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    tracing::info!(roles = roles::ALL.len(), permissions = permissions::ALL.len(), "default RBAC data seeded");

    Ok(())
}
