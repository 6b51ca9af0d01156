//! Shared fixtures for the service integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use smartstock::{InventoryService, LedgerStore, MemoryStore, StoreError};
use smartstock_core::command::{Command, NewProduct, NewWarehouse};
use smartstock_core::{Commit, LedgerState, Money, Product, Warehouse};
use tokio::sync::Mutex;

pub const OWNER: &str = "alice";

pub async fn memory_service() -> (InventoryService, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let service = InventoryService::open(store.clone()).await.unwrap();
    (service, store)
}

pub async fn add_warehouse(service: &InventoryService, name: &str) -> Warehouse {
    service
        .execute(
            OWNER,
            Command::CreateWarehouse(NewWarehouse::new(name, "NYC")),
        )
        .await
        .unwrap()
        .warehouse()
        .cloned()
        .unwrap()
}

pub fn widget(quantity: i64) -> NewProduct {
    NewProduct::new(
        "Widget",
        "Tools",
        quantity,
        Money::from_cents(500),
        Money::from_cents(800),
    )
}

pub async fn add_product(service: &InventoryService, input: NewProduct) -> Product {
    service
        .execute(OWNER, Command::CreateProduct(input))
        .await
        .unwrap()
        .product()
        .cloned()
        .unwrap()
}

/// Store that can be switched into a failing mode.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: Mutex<bool>,
}

impl FlakyStore {
    pub async fn set_failing(&self, failing: bool) {
        *self.failing.lock().await = failing;
    }

    pub async fn state(&self) -> LedgerState {
        self.inner.load().await.unwrap()
    }
}

#[async_trait]
impl LedgerStore for FlakyStore {
    async fn load(&self) -> Result<LedgerState, StoreError> {
        self.inner.load().await
    }

    async fn commit(&self, commit: &Commit) -> Result<(), StoreError> {
        if *self.failing.lock().await {
            return Err(StoreError::Unavailable("connection reset".into()));
        }
        self.inner.commit(commit).await
    }
}

/// Memory store whose commits take `delay` to land.
pub struct SlowStore {
    inner: MemoryStore,
    delay: Duration,
}

impl SlowStore {
    pub fn new(delay: Duration) -> Self {
        SlowStore {
            inner: MemoryStore::new(),
            delay,
        }
    }
}

#[async_trait]
impl LedgerStore for SlowStore {
    async fn load(&self) -> Result<LedgerState, StoreError> {
        self.inner.load().await
    }

    async fn commit(&self, commit: &Commit) -> Result<(), StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.commit(commit).await
    }
}
