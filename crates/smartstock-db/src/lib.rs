//! # smartstock-db: Database Layer for SmartStock
//!
//! This crate persists the ledger in SQLite through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       SmartStock Data Flow                              │
//! │                                                                         │
//! │  InventoryService::execute(command)                                    │
//! │       │  ledger.prepare() ──► Commit                                   │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  smartstock-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │ 001_init.sql │  │   │
//! │  │   │ commit(&Commit│◄───│ WarehouseRepo │    │              │  │   │
//! │  │   │ ) one tx      │    │ AuditRepo     │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <data dir>/smartstock/smartstock.db                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool, ledger commit and state loading
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Product, warehouse and audit repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use smartstock_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("smartstock.db")).await?;
//! let state = db.load_state().await?;
//! let ledger = Ledger::from_state(state);
//!
//! let commit = ledger.prepare(actor, command, Utc::now())?;
//! db.commit(&commit).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::audit::AuditRepository;
pub use repository::product::ProductRepository;
pub use repository::warehouse::WarehouseRepository;
