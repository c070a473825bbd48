//! Framework glue for [`AppError`]: database errors in, problem responses out

#[cfg(any(feature = "sqlx", feature = "axum"))]
use super::app_error::AppError;

/// Storage failures surface without leaking SQL; the original error stays
/// attached as the source for logs.
#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let mapped = match &err {
            sqlx::Error::RowNotFound => AppError::not_found("Record not found"),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::service_unavailable("Database unavailable")
            }
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::conflict("Record already exists")
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::conflict("Referenced record does not exist")
            }
            sqlx::Error::Database(db) if db.is_check_violation() => {
                AppError::bad_request("Value out of allowed range")
            }
            _ => AppError::internal("Database error"),
        };
        mapped.with_source(err)
    }
}

/// RFC 7807 problem document; `action` is present only when set
#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::{StatusCode, header};

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut problem = serde_json::json!({
            "type": "about:blank",
            "title": self.kind().as_str(),
            "status": status.as_u16(),
            "detail": self.message(),
        });
        if let Some(action) = self.action() {
            problem["action"] = serde_json::Value::from(action);
        }

        (
            status,
            [(header::CONTENT_TYPE, "application/problem+json")],
            problem.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    #[cfg(feature = "sqlx")]
    #[test]
    fn test_sqlx_errors_map_to_kinds() {
        use crate::error::{app_error::AppError, kind::ErrorKind};

        let err: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err: AppError = sqlx::Error::PoolTimedOut.into();
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[cfg(feature = "axum")]
    #[test]
    fn test_problem_response_status_and_content_type() {
        use axum::http::{StatusCode, header};
        use axum::response::IntoResponse;

        use crate::error::app_error::AppError;

        let response = AppError::locked("Too many wrong answers")
            .with_action("Wait before trying again")
            .into_response();
        assert_eq!(response.status(), StatusCode::LOCKED);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/problem+json"
        );
    }
}
