use chrono::{DateTime, Utc};

use crate::errors::AppError;

/// Rejects blank user identifiers. Ids are opaque, so the value is returned
/// exactly as given.
pub fn require_user_id<'a>(user_id: &'a str, field: &str) -> Result<&'a str, AppError> {
    if user_id.trim().is_empty() {
        return Err(AppError::invalid_input(format!("{field} must not be empty")));
    }
    Ok(user_id)
}

pub fn utc_now() -> DateTime<Utc> {
    Utc::now()
}
