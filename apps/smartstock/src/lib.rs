//! # SmartStock
//!
//! Inventory service built on the SmartStock ledger.
//!
//! ## Module Organization
//! ```text
//! smartstock/
//! ├── lib.rs          ◄─── You are here (startup wiring)
//! ├── config.rs       ◄─── smartstock.toml + environment overrides
//! ├── error.rs        ◄─── StoreError, AppError, ApiError
//! ├── store.rs        ◄─── LedgerStore trait (SQLite, memory)
//! ├── notifier.rs     ◄─── Notifier trait + background dispatcher
//! ├── undo.rs         ◄─── Delete snapshots kept for undo
//! ├── service.rs      ◄─── InventoryService (single writer)
//! └── main.rs         ◄─── `smartstock` binary (seed, backfill-codes, report)
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. AppConfig::load        defaults → toml → environment → validate     │
//! │  2. Database::new          SQLite, WAL, migrations                      │
//! │  3. InventoryService::open load products, warehouses, audit log         │
//! │  4. NotificationDispatcher spawned when notifications are enabled       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod notifier;
pub mod service;
pub mod store;
pub mod undo;

pub use config::AppConfig;
pub use error::{ApiError, AppError, AppResult, ErrorCode, StoreError};
pub use notifier::{
    ChannelNotifier, NotificationDispatcher, NotificationHandle, Notifier, TracingNotifier,
};
pub use service::{InventoryService, LedgerView};
pub use store::{LedgerStore, MemoryStore};
pub use undo::UndoBuffer;

use std::sync::Arc;

use smartstock_db::{Database, DbConfig};
use tracing::info;

/// Opens the configured database and builds a service on top of it.
///
/// Must be called inside a Tokio runtime; the notification dispatcher is
/// spawned onto it.
pub async fn start(config: &AppConfig) -> AppResult<InventoryService> {
    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(crate::config::ConfigError::from)?;
        }
    }

    let db = Database::new(
        DbConfig::new(config.database.path.clone()).max_connections(config.database.max_connections),
    )
    .await?;
    info!(path = ?config.database.path, "Database connected and migrations applied");

    let service = InventoryService::open(Arc::new(db))
        .await?
        .with_undo_window(config.undo_window());

    if !config.notifications.enabled {
        return Ok(service);
    }

    let notifiers: Vec<Arc<dyn Notifier>> = vec![Arc::new(TracingNotifier)];
    let handle = NotificationDispatcher::spawn(notifiers, config.notifications.channel_capacity);
    Ok(service.with_notifications(handle))
}
