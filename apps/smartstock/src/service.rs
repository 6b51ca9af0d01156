//! # Inventory Service
//!
//! The single writer around the ledger. Every command goes through
//! [`InventoryService::execute`]:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  execute(actor, command)                                                │
//! │                                                                         │
//! │  1. lock ledger            (one command at a time)                      │
//! │  2. prepare                validation only, nothing changes             │
//! │  3. store.commit           entity writes + audit entry, atomically      │
//! │       └── Err ──► StoreUnavailable, in-memory state untouched           │
//! │  4. apply                  in-memory catalog + audit log                │
//! │  5. publish view           watch channel ──► readers, subscribe_*()     │
//! │  6. hold undo snapshot     DeleteProduct only                           │
//! │  7. emit events            notification dispatcher (fire and forget)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads, the activity log included, are served from the last published
//! [`LedgerView`] and never wait on a command in flight.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use smartstock_core::command::{Command, ProductPatch};
use smartstock_core::{
    AuditEntry, AuditLog, AuditQuery, Catalog, InventorySummary, Ledger, LedgerError,
    LedgerResult, Product, ProductFilter, Receipt, Warehouse, WarehouseStats,
};
use tokio::sync::{watch, Mutex};
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, error, info, instrument};

use crate::error::StoreError;
use crate::notifier::NotificationHandle;
use crate::store::LedgerStore;
use crate::undo::UndoBuffer;

/// Default time a deleted product stays restorable.
pub const DEFAULT_UNDO_WINDOW: Duration = Duration::from_secs(5);

/// Ledger state as of the last applied command.
#[derive(Debug, Clone, Default)]
pub struct LedgerView {
    pub catalog: Arc<Catalog>,
    pub audit: Arc<AuditLog>,
    pub revision: u64,
}

impl LedgerView {
    fn of(ledger: &Ledger) -> Self {
        LedgerView {
            catalog: Arc::new(ledger.catalog().clone()),
            audit: Arc::new(ledger.audit().clone()),
            revision: ledger.revision(),
        }
    }
}

pub struct InventoryService {
    ledger: Mutex<Ledger>,
    store: Arc<dyn LedgerStore>,
    notifications: Option<NotificationHandle>,
    view_tx: watch::Sender<Arc<LedgerView>>,
    undo: Mutex<UndoBuffer>,
}

impl InventoryService {
    /// Loads persisted state from `store` and starts serving it.
    pub async fn open(store: Arc<dyn LedgerStore>) -> Result<Self, StoreError> {
        let state = store.load().await?;
        info!(
            products = state.products.len(),
            warehouses = state.warehouses.len(),
            audit_entries = state.audit_entries.len(),
            "Inventory service opened"
        );
        Ok(Self::with_ledger(Ledger::from_state(state), store))
    }

    /// Serves an already built ledger. `store` must hold the same state.
    pub fn with_ledger(ledger: Ledger, store: Arc<dyn LedgerStore>) -> Self {
        let (view_tx, _) = watch::channel(Arc::new(LedgerView::of(&ledger)));
        InventoryService {
            ledger: Mutex::new(ledger),
            store,
            notifications: None,
            view_tx,
            undo: Mutex::new(UndoBuffer::new(DEFAULT_UNDO_WINDOW)),
        }
    }

    pub fn with_notifications(mut self, handle: NotificationHandle) -> Self {
        self.notifications = Some(handle);
        self
    }

    pub fn with_undo_window(mut self, window: Duration) -> Self {
        self.undo = Mutex::new(UndoBuffer::new(window));
        self
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Runs one command to completion.
    ///
    /// On success the change is durable, visible to readers and
    /// subscribers, and its events are queued for delivery. On failure
    /// nothing changed anywhere.
    #[instrument(skip(self, command), fields(action = %command.action()))]
    pub async fn execute(&self, actor: &str, command: Command) -> LedgerResult<Receipt> {
        let mut ledger = self.ledger.lock().await;

        let commit = ledger.prepare(actor, command, Utc::now())?;
        debug!(mutations = commit.mutations.len(), "Command prepared");

        if let Err(e) = self.store.commit(&commit).await {
            error!(error = %e, "Failed to persist commit");
            return Err(e.into());
        }

        let receipt = ledger.apply(commit)?;
        self.view_tx.send_replace(Arc::new(LedgerView::of(&ledger)));
        drop(ledger);

        if let Some(snapshot) = receipt.snapshot() {
            self.undo.lock().await.hold(snapshot.clone(), Instant::now());
        }

        if let Some(handle) = &self.notifications {
            handle.emit(receipt.events.iter().cloned());
        }

        info!(
            user = %receipt.audit.user,
            entity = %receipt.audit.product_name,
            revision = receipt.revision,
            "Command applied"
        );
        Ok(receipt)
    }

    /// Restores a product deleted within the undo window.
    pub async fn undo_delete(&self, actor: &str, product_id: &str) -> LedgerResult<Receipt> {
        let now = Instant::now();
        let (snapshot, expires_at) = {
            let mut undo = self.undo.lock().await;
            let expires_at = undo.expires_at(product_id);
            match (undo.take(product_id, now), expires_at) {
                (Some(snapshot), Some(at)) => (snapshot, at),
                _ => return Err(LedgerError::not_found("Deleted product", product_id)),
            }
        };

        let result = self
            .execute(
                actor,
                Command::RestoreProduct {
                    snapshot: snapshot.clone(),
                },
            )
            .await;

        // Only retryable failures keep the undo offer alive.
        if let Err(e) = &result {
            if e.is_retryable() {
                self.undo.lock().await.put_back(snapshot, expires_at);
            }
        }
        result
    }

    /// Whether `product_id` can still be restored with `undo_delete`.
    pub async fn can_undo(&self, product_id: &str) -> bool {
        let mut undo = self.undo.lock().await;
        undo.purge_expired(Instant::now());
        undo.expires_at(product_id).is_some()
    }

    /// Gives every product without a code the next free `PROD-NNN` code,
    /// oldest product first. Returns the products that were updated.
    pub async fn backfill_product_codes(&self, actor: &str) -> LedgerResult<Vec<Product>> {
        let mut missing: Vec<Product> = self
            .catalog()
            .products()
            .filter(|p| p.product_code.is_none())
            .cloned()
            .collect();
        missing.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let mut updated = Vec::with_capacity(missing.len());
        for product in missing {
            let code = self.catalog().next_product_code();
            let patch = ProductPatch {
                product_code: Some(code),
                ..Default::default()
            };
            let command = Command::UpdateProduct {
                id: product.id.clone(),
                patch,
            };
            match self.execute(actor, command).await {
                Ok(receipt) => updated.extend(receipt.product().cloned()),
                // Deleted since the list was taken.
                Err(LedgerError::NotFound { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        info!(count = updated.len(), "Product codes backfilled");
        Ok(updated)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The most recently published view.
    pub fn view(&self) -> Arc<LedgerView> {
        self.view_tx.borrow().clone()
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        self.view_tx.borrow().catalog.clone()
    }

    pub fn products(&self, filter: &ProductFilter) -> Vec<Product> {
        self.view_tx.borrow().catalog.filter_products(filter)
    }

    pub fn product(&self, id: &str) -> Option<Product> {
        self.view_tx.borrow().catalog.product(id).cloned()
    }

    /// Warehouses whose name or location contains `term`.
    pub fn warehouses(&self, term: &str) -> Vec<Warehouse> {
        self.view_tx.borrow().catalog.search_warehouses(term)
    }

    pub fn warehouse_stats(&self, name: &str) -> WarehouseStats {
        self.view_tx.borrow().catalog.warehouse_stats(name)
    }

    pub fn summary(&self) -> InventorySummary {
        self.view_tx.borrow().catalog.summary()
    }

    pub fn categories(&self) -> Vec<String> {
        self.view_tx.borrow().catalog.categories()
    }

    /// Matching activity log entries, newest first.
    pub fn audit(&self, query: &AuditQuery) -> Vec<AuditEntry> {
        self.view_tx.borrow().audit.query(query)
    }

    pub fn revision(&self) -> u64 {
        self.view_tx.borrow().revision
    }

    // =========================================================================
    // Live queries
    // =========================================================================

    /// Live product list: yields the current matches immediately, then
    /// again after every command.
    pub fn subscribe_products(
        &self,
        filter: ProductFilter,
    ) -> impl Stream<Item = Vec<Product>> + Send + 'static {
        WatchStream::new(self.view_tx.subscribe())
            .map(move |view| view.catalog.filter_products(&filter))
    }

    /// Live warehouse list, searched by name or location.
    pub fn subscribe_warehouses(
        &self,
        term: impl Into<String>,
    ) -> impl Stream<Item = Vec<Warehouse>> + Send + 'static {
        let term = term.into();
        WatchStream::new(self.view_tx.subscribe())
            .map(move |view| view.catalog.search_warehouses(&term))
    }

    /// Live activity log.
    pub fn subscribe_audit(
        &self,
        query: AuditQuery,
    ) -> impl Stream<Item = Vec<AuditEntry>> + Send + 'static {
        WatchStream::new(self.view_tx.subscribe()).map(move |view| view.audit.query(&query))
    }

    /// Stops the notification dispatcher, if one is attached.
    pub async fn shutdown(&self) {
        if let Some(handle) = &self.notifications {
            if handle.shutdown().await.is_err() {
                debug!("Notification dispatcher already stopped");
            }
        }
        info!("Inventory service stopped");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use smartstock_core::command::{NewProduct, NewWarehouse};
    use smartstock_core::Money;

    async fn service() -> InventoryService {
        InventoryService::open(Arc::new(MemoryStore::new()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_execute_publishes_snapshot() {
        let service = service().await;
        let before = service.catalog();

        service
            .execute(
                "alice",
                Command::CreateWarehouse(NewWarehouse::new("Main", "Dock 1")),
            )
            .await
            .unwrap();

        assert_eq!(before.warehouse_count(), 0);
        assert_eq!(service.catalog().warehouse_count(), 1);
        assert_eq!(service.revision(), 1);
    }

    #[tokio::test]
    async fn test_rejected_command_changes_nothing() {
        let service = service().await;

        let err = service
            .execute(
                "alice",
                Command::CreateProduct(NewProduct::new(
                    "Widget",
                    "Tools",
                    3,
                    Money::from_cents(500),
                    Money::from_cents(400),
                )),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(service.summary().total_products, 0);
        assert!(service.audit(&AuditQuery::default()).is_empty());
        assert_eq!(service.revision(), 0);
    }

    #[tokio::test]
    async fn test_undo_unknown_product() {
        let service = service().await;
        let err = service.undo_delete("alice", "nope").await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { .. }));
    }
}
