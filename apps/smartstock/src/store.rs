//! # Ledger Store
//!
//! Where committed ledger changes live between runs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  InventoryService                                                       │
//! │        │  load() once at startup                                        │
//! │        │  commit(&Commit) per command, before the in-memory apply       │
//! │        ▼                                                                │
//! │  dyn LedgerStore ──┬──► Database (SQLite, one transaction per commit)   │
//! │                    └──► MemoryStore (tests, demos)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `commit` either persists every mutation plus the audit entry, or
//! returns an error and persists nothing.

use async_trait::async_trait;
use smartstock_core::{AuditEntry, Catalog, Commit, LedgerState};
use smartstock_db::Database;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StoreError;

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Reads the full persisted state.
    async fn load(&self) -> Result<LedgerState, StoreError>;

    /// Persists one prepared commit atomically.
    async fn commit(&self, commit: &Commit) -> Result<(), StoreError>;
}

#[async_trait]
impl LedgerStore for Database {
    async fn load(&self) -> Result<LedgerState, StoreError> {
        Ok(self.load_state().await?)
    }

    async fn commit(&self, commit: &Commit) -> Result<(), StoreError> {
        Ok(Database::commit(self, commit).await?)
    }
}

// =============================================================================
// Memory Store
// =============================================================================

#[derive(Debug, Default)]
struct MemoryState {
    catalog: Catalog,
    audit: Vec<AuditEntry>,
}

/// Non-durable store kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from existing state, as if it had been loaded from disk.
    pub fn with_state(state: LedgerState) -> Self {
        MemoryStore {
            state: Mutex::new(MemoryState {
                catalog: Catalog::from_parts(state.products, state.warehouses),
                audit: state.audit_entries,
            }),
        }
    }

    /// Number of audit entries persisted so far.
    pub async fn audit_len(&self) -> usize {
        self.state.lock().await.audit.len()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn load(&self) -> Result<LedgerState, StoreError> {
        let state = self.state.lock().await;
        Ok(LedgerState {
            products: state.catalog.products().cloned().collect(),
            warehouses: state.catalog.warehouses().cloned().collect(),
            audit_entries: state.audit.clone(),
        })
    }

    async fn commit(&self, commit: &Commit) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        for mutation in &commit.mutations {
            state.catalog.apply(mutation);
        }
        state.audit.push(commit.audit.clone());

        debug!(action = %commit.audit.action, "Commit stored in memory");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
