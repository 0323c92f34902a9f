use std::collections::BTreeMap;

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::rbac::{Permission, Role};

fn parse_uuid(s: &str, column: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(s.trim()).map_err(|e| AppError::internal(format!("invalid uuid in {}: {}", column, e)))
}

fn get<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T, AppError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column)
        .map_err(|e| AppError::internal(format!("missing {}: {}", column, e)))
}

/// Folds a role/permission LEFT JOIN (one row per grant, permission columns
/// NULL for roles without grants) into roles, preserving first-seen order.
pub fn roles_from_joined_rows(rows: &[SqliteRow]) -> Result<Vec<Role>, AppError> {
    let mut order: Vec<Uuid> = Vec::new();
    let mut roles: BTreeMap<Uuid, Role> = BTreeMap::new();

    for row in rows {
        let role_id_s: String = get(row, "role_id")?;
        let role_id = parse_uuid(&role_id_s, "role_id")?;

        if !roles.contains_key(&role_id) {
            order.push(role_id);
            roles.insert(
                role_id,
                Role {
                    id: role_id,
                    name: get(row, "role_name")?,
                    description: get(row, "role_description")?,
                    permissions: Vec::new(),
                },
            );
        }

        let permission_id: Option<String> = get(row, "permission_id")?;
        if let Some(permission_id) = permission_id {
            let permission = Permission {
                id: parse_uuid(&permission_id, "permission_id")?,
                name: get(row, "permission_name")?,
                action: get(row, "permission_action")?,
            };
            if let Some(role) = roles.get_mut(&role_id) {
                role.permissions.push(permission);
            }
        }
    }

    Ok(order.into_iter().filter_map(|id| roles.remove(&id)).collect())
}
