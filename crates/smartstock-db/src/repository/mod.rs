//! # Repository Module
//!
//! Database repository implementations for SmartStock.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Database::commit(&Commit)          db.products().list_all()           │
//! │       │  one transaction                 │  pool connection            │
//! │       ▼                                  ▼                              │
//! │  product::upsert(&mut *tx, ..)      ProductRepository                  │
//! │  warehouse::delete(&mut *tx, ..)    WarehouseRepository                │
//! │  audit::append(&mut *tx, ..)        AuditRepository                    │
//! │       │                                  │                              │
//! │       └──────────────┬───────────────────┘                              │
//! │                      ▼                                                  │
//! │                SQLite Database                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Write helpers take `&mut SqliteConnection` so the same SQL runs inside a
//! transaction or on a plain pooled connection.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product reads and writes
//! - [`WarehouseRepository`](warehouse::WarehouseRepository) - Warehouse reads and writes
//! - [`AuditRepository`](audit::AuditRepository) - Append-only activity log

pub mod audit;
pub mod product;
pub mod warehouse;
