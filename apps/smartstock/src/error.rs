//! # Application Errors
//!
//! - `StoreError`: what a `LedgerStore` backend reports.
//! - `AppError`: startup and CLI failures (config, database, ledger).
//! - `ApiError`: the serialized shape a frontend receives when a command
//!   fails.
//!
//! ## Serialization
//! ```json
//! {
//!   "code": "CONFLICT",
//!   "message": "Conflict: Warehouse 'Main' still holds 3 product(s)"
//! }
//! ```

use serde::Serialize;
use smartstock_core::LedgerError;
use smartstock_db::DbError;
use thiserror::Error;
use ts_rs::TS;

use crate::config::ConfigError;

// =============================================================================
// Store Error
// =============================================================================

/// Failure reported by a ledger store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] DbError),

    /// Backend could not be reached at all.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        LedgerError::StoreUnavailable(err.to_string())
    }
}

// =============================================================================
// App Error
// =============================================================================

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("{0}")]
    Usage(String),
}

pub type AppResult<T> = Result<T, AppError>;

// =============================================================================
// API Error
// =============================================================================

/// Error returned to a frontend.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
///
/// ## Usage in Frontend
/// ```typescript
/// try {
///   await invoke('execute', { command });
/// } catch (e) {
///   switch (e.code) {
///     case 'PRECONDITION_FAILED':
///       await refresh();
///       break;
///     case 'VALIDATION_ERROR':
///       showForm(e.message);
///       break;
///     default:
///       showError(e.message);
///   }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Resource not found (404)
    NotFound,

    /// Command would break a catalog rule (409)
    Conflict,

    /// State moved underneath the caller (412)
    PreconditionFailed,

    /// Persistence failed, retry later (503)
    StoreUnavailable,

    /// Internal error (500)
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let code = match &err {
            LedgerError::Validation(_) => ErrorCode::ValidationError,
            LedgerError::NotFound { .. } => ErrorCode::NotFound,
            LedgerError::Conflict(_) => ErrorCode::Conflict,
            LedgerError::PreconditionFailed(_) => ErrorCode::PreconditionFailed,
            LedgerError::StoreUnavailable(detail) => {
                // Log the backend detail but return a generic message
                tracing::error!(detail = %detail, "Store unavailable");
                return ApiError::new(
                    ErrorCode::StoreUnavailable,
                    "Inventory could not be saved, please try again",
                );
            }
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Ledger(e) => e.into(),
            AppError::Store(e) => LedgerError::from(e).into(),
            other => {
                tracing::error!(error = %other, "Internal error");
                ApiError::internal(other.to_string())
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================
