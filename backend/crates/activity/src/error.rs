//! Activity Error Types

use kernel::error::app_error::AppError;
use thiserror::Error;

pub type ActivityResult<T> = Result<T, ActivityError>;

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ActivityError> for AppError {
    fn from(err: ActivityError) -> Self {
        match err {
            ActivityError::Database(e) => AppError::from(e),
            ActivityError::Internal(msg) => AppError::internal(msg),
        }
    }
}
