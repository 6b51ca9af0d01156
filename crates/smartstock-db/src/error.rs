//! # Database Error Types
//!
//! ```text
//! sqlx::Error ──► DbError ──► StoreError (app) ──► LedgerError::StoreUnavailable
//! ```
//!
//! The ledger validates every command before it reaches SQLite, so a
//! constraint error here means the database and the in-memory ledger
//! disagree. Callers treat every variant as "the store is unavailable".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the write (`warehouses.name`,
    /// `products.product_code`).
    #[error("Duplicate value for {column}")]
    UniqueViolation { column: String },

    /// A CHECK constraint rejected the write (negative quantity or a
    /// non-positive price).
    #[error("Constraint violation: {0}")]
    CheckViolation(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction could not be started or committed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A stored value could not be turned back into a domain type.
    #[error("Corrupt row: {0}")]
    Decode(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            // SQLite spells these "UNIQUE constraint failed: <table>.<column>"
            // and "CHECK constraint failed: <expr>".
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                if let Some(column) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        column: column.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::ColumnDecode { index, source } => {
                DbError::Decode(format!("column {index}: {source}"))
            }

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
