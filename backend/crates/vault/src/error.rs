//! Vault Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::seal::SealError;
use platform::sharing::SharingError;
use platform::timelock::TimelockError;
use thiserror::Error;

pub type VaultResult<T> = Result<T, VaultError>;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Resource belongs to another user; reported like a missing session
    #[error("Not authorized for this resource")]
    NotOwner,

    #[error("Secret is already assigned to this recipient")]
    AlreadyAssigned,

    #[error("Secret has not been released")]
    NotYetReleased,

    #[error("Secret questions unlock at {available_at}")]
    TooEarly { available_at: DateTime<Utc> },

    #[error("Too many wrong answers, unlocking is paused until {until}")]
    UnlockLocked { until: DateTime<Utc> },

    #[error("{correct} of {needed} required answers are correct")]
    InsufficientAnswers { correct: usize, needed: usize },

    /// Input rejected by validation; carries its action hint
    #[error("{0}")]
    Validation(AppError),

    #[error("Cryptographic failure: {0}")]
    Crypto(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VaultError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            VaultError::NotFound(_) => ErrorKind::NotFound,
            VaultError::NotOwner => ErrorKind::Unauthorized,
            VaultError::AlreadyAssigned => ErrorKind::Conflict,
            VaultError::NotYetReleased | VaultError::InsufficientAnswers { .. } => {
                ErrorKind::Forbidden
            }
            VaultError::TooEarly { .. } | VaultError::UnlockLocked { .. } => ErrorKind::Locked,
            VaultError::Validation(e) => e.kind(),
            VaultError::Crypto(_) | VaultError::Database(_) | VaultError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    pub fn into_app_error(self) -> AppError {
        match self {
            VaultError::Validation(e) => e,
            VaultError::Crypto(_) | VaultError::Database(_) | VaultError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            VaultError::TooEarly { .. } => {
                AppError::locked(self.to_string()).with_action("Try again after the unlock time")
            }
            VaultError::UnlockLocked { .. } => {
                AppError::locked(self.to_string()).with_action("Wait before trying again")
            }
            VaultError::InsufficientAnswers { .. } => {
                AppError::forbidden(self.to_string()).with_action("Check your answers and retry")
            }
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    fn log(&self) {
        match self {
            VaultError::Database(e) => {
                tracing::error!(error = %e, "Vault database error");
            }
            VaultError::Crypto(msg) => {
                tracing::error!(message = %msg, "Vault crypto error");
            }
            VaultError::Internal(msg) => {
                tracing::error!(message = %msg, "Vault internal error");
            }
            VaultError::NotOwner => {
                tracing::warn!("Access to resource owned by another user");
            }
            VaultError::InsufficientAnswers { correct, needed } => {
                tracing::warn!(correct, needed, "Secret question unlock failed");
            }
            VaultError::UnlockLocked { until } => {
                tracing::warn!(%until, "Secret unlock attempted while locked out");
            }
            _ => {
                tracing::debug!(error = %self, "Vault error");
            }
        }
    }
}

impl IntoResponse for VaultError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

impl From<AppError> for VaultError {
    fn from(err: AppError) -> Self {
        if err.is_server_error() {
            VaultError::Internal(err.to_string())
        } else {
            VaultError::Validation(err)
        }
    }
}

impl From<SealError> for VaultError {
    fn from(err: SealError) -> Self {
        VaultError::Crypto(err.to_string())
    }
}

impl From<SharingError> for VaultError {
    fn from(err: SharingError) -> Self {
        match err {
            SharingError::InvalidThreshold { .. } => {
                VaultError::Validation(AppError::bad_request(err.to_string()))
            }
            other => VaultError::Crypto(other.to_string()),
        }
    }
}

impl From<TimelockError> for VaultError {
    fn from(err: TimelockError) -> Self {
        match err {
            TimelockError::TooEarly { available_at, .. } => VaultError::TooEarly { available_at },
            other => VaultError::Crypto(other.to_string()),
        }
    }
}

impl From<activity::ActivityError> for VaultError {
    fn from(err: activity::ActivityError) -> Self {
        match err {
            activity::ActivityError::Database(e) => VaultError::Database(e),
            activity::ActivityError::Internal(msg) => VaultError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(VaultError::NotFound("Secret").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(VaultError::NotOwner.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(VaultError::AlreadyAssigned.status_code(), StatusCode::CONFLICT);
        assert_eq!(VaultError::NotYetReleased.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            VaultError::TooEarly { available_at: Utc::now() }.status_code(),
            StatusCode::LOCKED
        );
        assert_eq!(
            VaultError::InsufficientAnswers { correct: 1, needed: 2 }.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            VaultError::UnlockLocked { until: Utc::now() }.status_code(),
            StatusCode::LOCKED
        );
    }

    #[test]
    fn test_timelock_too_early_maps_to_locked() {
        let err: VaultError = TimelockError::TooEarly {
            round: 9,
            available_at: Utc::now(),
        }
        .into();
        assert!(matches!(err, VaultError::TooEarly { .. }));
    }

    #[test]
    fn test_internal_details_hidden() {
        let app = VaultError::Crypto("aead tag mismatch".into()).into_app_error();
        assert!(!app.message().contains("aead"));
    }
}
