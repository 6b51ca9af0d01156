//! # smartstock-core: Pure Inventory Ledger for SmartStock
//!
//! This crate is the **heart** of SmartStock. It owns every rule about how
//! stock quantities, warehouse links and the activity log change, with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       SmartStock Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Dashboard (web UI)                           │   │
//! │  │   Inventory ──► Add Product ──► Warehouses ──► Activity Logs   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Command                                │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 InventoryService (apps/smartstock)              │   │
//! │  │      single writer, store commit, notifier, undo buffer        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ smartstock-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  ledger   │  │  catalog  │  │   audit   │  │   alert   │  │   │
//! │  │   │  Command  │  │ Products  │  │  AuditLog │  │ threshold │  │   │
//! │  │   │  Commit   │  │Warehouses │  │  queries  │  │  message  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • CLOCK PASSED IN          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │ Commit                                 │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 smartstock-db (Database Layer)                  │   │
//! │  │        SQLite transaction: entity rows + one audit row          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Warehouse, AuditEntry, Event)
//! - [`money`] - Integer prices
//! - [`error`] - Ledger and validation errors
//! - [`validation`] - Field rules
//! - [`command`] - The commands a caller can issue
//! - [`catalog`] - Current products and warehouses (the Catalog Store)
//! - [`audit`] - Append-only activity log
//! - [`ledger`] - Validates commands and applies them atomically
//! - [`alert`] - Low-stock threshold rules and alert text
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use smartstock_core::command::{Command, NewProduct, NewWarehouse};
//! use smartstock_core::ledger::Ledger;
//! use smartstock_core::Money;
//!
//! let mut ledger = Ledger::new();
//! ledger
//!     .execute("owner@example.com", Command::CreateWarehouse(NewWarehouse::new("Main", "NYC")), Utc::now())
//!     .unwrap();
//!
//! let mut widget = NewProduct::new("Widget", "Parts", 10, Money::from_cents(500), Money::from_cents(800));
//! widget.warehouse = Some("Main".to_string());
//! let receipt = ledger
//!     .execute("owner@example.com", Command::CreateProduct(widget), Utc::now())
//!     .unwrap();
//!
//! assert_eq!(receipt.product().unwrap().quantity, 10);
//! assert_eq!(ledger.audit().len(), 2);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod alert;
pub mod audit;
pub mod catalog;
pub mod command;
pub mod error;
pub mod ledger;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use audit::{AuditLog, AuditQuery};
pub use catalog::{Catalog, InventorySummary, Mutation, ProductFilter, WarehouseStats};
pub use command::Command;
pub use error::{LedgerError, LedgerResult, ValidationError};
pub use ledger::{Commit, Ledger, LedgerState, Outcome, Receipt};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Quantity below which a product counts as low stock.
///
/// A product at exactly this quantity is *not* low.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Display label for a product without a warehouse.
pub const UNASSIGNED_LABEL: &str = "Unassigned";

/// Stored manager when a warehouse is created without one.
pub const DEFAULT_MANAGER: &str = "Not assigned";

/// Prefix of generated product codes ("PROD-001").
pub const PRODUCT_CODE_PREFIX: &str = "PROD-";
