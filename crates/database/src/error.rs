use financing::FinancingError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load environment variables for database connection: {0}")]
    ConnectionConfigError(String),

    #[error("Database operation failed: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("A {0} with this identifier already exists.")]
    Duplicate(&'static str),

    /// A value too wide for its `NUMERIC` column.
    #[error("{0} is out of range for its column.")]
    OutOfRange(&'static str),

    #[error("Product {0} does not exist.")]
    ProductNotFound(Uuid),

    #[error("The purchase terms were rejected: {0}")]
    Financing(#[from] FinancingError),
}

impl DbError {
    /// Maps unique-constraint violations to `Duplicate`, leaving other errors as they are.
    pub(crate) fn on_insert(err: sqlx::Error, entity: &'static str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => Self::Duplicate(entity),
            _ => Self::ConnectionError(err),
        }
    }
}
