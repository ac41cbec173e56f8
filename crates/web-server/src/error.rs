use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use core_types::CoreError;
use database::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Missing fields, wrong primitive types, unparseable bodies or dates.
    #[error("Validation error: {0}")]
    Validation(String),
    /// Well-typed input that breaks a business rule.
    #[error("Unprocessable: {0}")]
    Unprocessable(String),
    /// An identifier that is already taken. Reported as 422, not 409.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Rate index error: {0}")]
    Upstream(#[from] api_client::error::ApiError),
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Folds a failed product or purchase write into a 422.
    ///
    /// Every persistence failure on these paths is reported as unprocessable,
    /// including ones that are really server-side; the log keeps them apart.
    pub fn rejected_write(err: DbError) -> Self {
        match err {
            DbError::Duplicate(_) => AppError::Conflict(err.to_string()),
            DbError::ProductNotFound(_) | DbError::Financing(_) | DbError::OutOfRange(_) => {
                AppError::Unprocessable(err.to_string())
            }
            other => {
                tracing::error!(error = ?other, "Write failed inside the request.");
                AppError::Unprocessable(other.to_string())
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Upstream(_) => StatusCode::BAD_REQUEST,
            AppError::Unprocessable(_) | AppError::Conflict(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Malformed(_) | CoreError::InvalidWindow(_) => {
                AppError::Validation(err.to_string())
            }
            CoreError::InvalidInput(..) => AppError::Unprocessable(err.to_string()),
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Errors are answered with a bare status code; the detail only goes to the log.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed.");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Request rejected.");
        }
        status.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use financing::FinancingError;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn write_failures_are_all_unprocessable() {
        let cases = [
            DbError::Duplicate("product"),
            DbError::ProductNotFound(Uuid::nil()),
            DbError::Financing(FinancingError::DownPaymentExceedsPrice {
                down_payment: dec!(2),
                price: dec!(1),
            }),
            DbError::ConnectionConfigError("DATABASE_URL must be set.".to_string()),
        ];
        for err in cases {
            assert_eq!(
                AppError::rejected_write(err).status(),
                StatusCode::UNPROCESSABLE_ENTITY
            );
        }
    }

    #[test]
    fn read_failures_are_server_errors() {
        let err = AppError::from(DbError::ConnectionConfigError("x".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn core_errors_split_between_400_and_422() {
        assert_eq!(
            AppError::from(CoreError::Malformed("x".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(CoreError::InvalidWindow("x".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(CoreError::InvalidInput("id".to_string(), "x".to_string())).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
