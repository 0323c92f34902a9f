pub type AppResult<T> = Result<T, AppError>;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("role store unavailable")]
    StoreUnavailable(#[from] sqlx::Error),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Errors caused by the caller rather than by the store or the environment.
    /// Callers map these to a denial or bad-request response, everything else
    /// to a server error.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::InvalidInput(_) | AppError::Forbidden(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Forbidden(_) => "forbidden",
            AppError::StoreUnavailable(_) => "store_unavailable",
            AppError::Configuration(_) => "configuration",
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_client_errors() {
        assert!(AppError::invalid_input("user id is required").is_client_error());
        assert!(AppError::forbidden("editTask").is_client_error());
        assert!(!AppError::StoreUnavailable(sqlx::Error::PoolTimedOut).is_client_error());
        assert!(!AppError::internal("bad row").is_client_error());
    }

    #[test]
    fn store_errors_convert_from_sqlx() {
        let err: AppError = sqlx::Error::PoolClosed.into();
        assert_eq!(err.kind(), "store_unavailable");
        assert_eq!(err.to_string(), "role store unavailable");
    }

    #[test]
    fn classification_survives_anyhow_context() {
        use anyhow::Context;

        let wrapped = Err::<(), _>(AppError::invalid_input("user_id must not be empty"))
            .context("failed to sync roles")
            .unwrap_err();
        let app_err = wrapped.downcast_ref::<AppError>().unwrap();
        assert!(app_err.is_client_error());
        assert_eq!(app_err.kind(), "invalid_input");

        let wrapped = anyhow::Error::from(AppError::configuration("DATABASE_URL not set"));
        let app_err = wrapped.downcast_ref::<AppError>().unwrap();
        assert!(!app_err.is_client_error());
        assert_eq!(app_err.kind(), "configuration");
    }
}
