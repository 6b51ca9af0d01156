//! # Error Types
//!
//! Domain-specific error types for smartstock-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  smartstock-core errors (this file)                                    │
//! │  ├── LedgerError      - Why a command was rejected                     │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  smartstock-db errors (separate crate)                                 │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  App errors                                                            │
//! │  └── ApiError         - What the frontend sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → LedgerError → ApiError → Frontend             │
//! │        DbError ──────────► LedgerError::StoreUnavailable               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Retry Semantics
//! | Variant              | Caller's fault | Retry?                         |
//! |----------------------|----------------|--------------------------------|
//! | `Validation`         | yes            | no                             |
//! | `NotFound`           | yes            | no                             |
//! | `Conflict`           | yes            | no, resolve first              |
//! | `PreconditionFailed` | no             | yes, after re-reading state    |
//! | `StoreUnavailable`   | no             | yes, with backoff              |

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Ledger Error
// =============================================================================

/// Why the ledger refused (or could not complete) a command.
///
/// A rejected command never changes the catalog and never appends an
/// audit entry.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed or out-of-range input.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A referenced product or warehouse does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Applying the command would break a catalog invariant
    /// (e.g. deleting a warehouse that still holds products).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The entity changed since the caller last observed it.
    ///
    /// ## When This Occurs
    /// - TransferStock names a source warehouse the product is no longer in
    /// - A prepared commit is applied after another commit landed first
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// The backing store could not persist the command.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl LedgerError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        LedgerError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Whether the same command may succeed if submitted again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::PreconditionFailed(_) | LedgerError::StoreUnavailable(_)
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when command input doesn't meet requirements.
/// They are checked before any catalog lookup.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be zero.
    #[error("{field} must not be zero")]
    MustBeNonZero { field: String },

    /// Invalid format (e.g., a price with three decimals).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Selling price does not exceed purchase price.
    #[error("Selling price ({selling}) must be greater than purchase price ({purchase})")]
    PriceNotAboveCost { purchase: Money, selling: Money },

    /// Source and destination of a transfer are the same warehouse.
    #[error("Source and destination warehouse are both '{name}'")]
    SameWarehouse { name: String },

    /// Not enough stock to move.
    #[error("Insufficient stock: available {available}, requested {requested}")]
    InsufficientStock { available: i64, requested: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with LedgerError.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Unit Tests
// =============================================================================
