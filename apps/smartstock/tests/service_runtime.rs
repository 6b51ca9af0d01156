//! Store failures, undo, live subscriptions, notifications and SQLite
//! persistence through `InventoryService`.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{add_product, add_warehouse, memory_service, widget, FlakyStore, SlowStore, OWNER};
use smartstock::{
    ApiError, ChannelNotifier, ErrorCode, InventoryService, NotificationDispatcher, Notifier,
};
use smartstock_core::command::{Command, NewWarehouse, StockTransfer, WarehousePatch};
use smartstock_core::{AuditAction, AuditQuery, EventKind, LedgerError, ProductFilter};
use smartstock_db::{Database, DbConfig};
use tokio::time::timeout;
use tokio_stream::StreamExt;

// =============================================================================
// Store failures
// =============================================================================

#[tokio::test]
async fn store_failure_leaves_state_untouched() {
    let store = Arc::new(FlakyStore::default());
    let service = InventoryService::open(store.clone()).await.unwrap();
    add_warehouse(&service, "Main").await;
    add_warehouse(&service, "Overflow").await;
    let product = add_product(&service, widget(10).in_warehouse("Main")).await;
    let revision = service.revision();

    store.set_failing(true).await;
    let err = service
        .execute(
            OWNER,
            Command::TransferStock(StockTransfer {
                id: product.id.clone(),
                from: "Main".into(),
                to: "Overflow".into(),
                quantity: 4,
            }),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::StoreUnavailable(_)));
    assert!(err.is_retryable());
    assert_eq!(ApiError::from(err).code, ErrorCode::StoreUnavailable);

    // Neither the in-memory view nor the store moved.
    let current = service.product(&product.id).unwrap();
    assert_eq!(current.quantity, 10);
    assert_eq!(current.warehouse.as_deref(), Some("Main"));
    assert_eq!(service.revision(), revision);
    assert_eq!(store.state().await.audit_entries.len(), 3);

    // The same command succeeds once the store is back.
    store.set_failing(false).await;
    let receipt = service
        .execute(
            OWNER,
            Command::TransferStock(StockTransfer {
                id: product.id.clone(),
                from: "Main".into(),
                to: "Overflow".into(),
                quantity: 4,
            }),
        )
        .await
        .unwrap();
    assert_eq!(receipt.audit.action, AuditAction::TransferStock);
    assert_eq!(store.state().await.audit_entries.len(), 4);
}

#[tokio::test]
async fn concurrent_commands_are_serialized() {
    let (service, _) = memory_service().await;
    let service = Arc::new(service);
    let product = add_product(&service, widget(0)).await;

    let mut tasks = Vec::new();
    for _ in 0..20 {
        let service = service.clone();
        let id = product.id.clone();
        tasks.push(tokio::spawn(async move {
            service
                .execute(OWNER, Command::AdjustStock { id, delta: 1 })
                .await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(service.product(&product.id).unwrap().quantity, 20);
    let adjusts = service
        .audit(&AuditQuery::default().by_action(AuditAction::StockAdjust));
    assert_eq!(adjusts.len(), 20);
    assert!(adjusts.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
}

#[tokio::test]
async fn reads_do_not_wait_for_commands_in_flight() {
    let service = Arc::new(
        InventoryService::open(Arc::new(SlowStore::new(Duration::from_millis(500))))
            .await
            .unwrap(),
    );
    add_warehouse(&service, "Main").await;

    let writer = {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .execute(
                    OWNER,
                    Command::CreateWarehouse(NewWarehouse::new("Overflow", "NJ")),
                )
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!writer.is_finished());

    // Served from the last published view while the write is pending.
    let started = std::time::Instant::now();
    let entries = service.audit(&AuditQuery::recent(10));
    let warehouses = service.warehouses("");
    assert!(started.elapsed() < Duration::from_millis(100));
    assert_eq!(entries.len(), 1);
    assert_eq!(warehouses.len(), 1);
    assert_eq!(service.revision(), 1);

    writer.await.unwrap().unwrap();
    assert_eq!(service.audit(&AuditQuery::recent(10)).len(), 2);
    assert_eq!(service.revision(), 2);
}

// =============================================================================
// Undo
// =============================================================================

#[tokio::test]
async fn undo_restores_deleted_product() {
    let (service, _) = memory_service().await;
    add_warehouse(&service, "Main").await;
    let product = add_product(&service, widget(3).in_warehouse("Main")).await;

    service
        .execute(OWNER, Command::DeleteProduct { id: product.id.clone() })
        .await
        .unwrap();
    assert!(service.product(&product.id).is_none());
    assert!(service.can_undo(&product.id).await);

    let receipt = service.undo_delete(OWNER, &product.id).await.unwrap();
    assert_eq!(receipt.audit.action, AuditAction::RestoreProduct);

    let restored = service.product(&product.id).unwrap();
    assert_eq!(restored.quantity, 3);
    assert_eq!(restored.warehouse.as_deref(), Some("Main"));

    // A snapshot is good for one restore only.
    let err = service.undo_delete(OWNER, &product.id).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { .. }));
}

#[tokio::test]
async fn undo_window_expires() {
    let (service, _) = memory_service().await;
    let service = service.with_undo_window(Duration::from_millis(50));
    let product = add_product(&service, widget(3)).await;

    service
        .execute(OWNER, Command::DeleteProduct { id: product.id.clone() })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(120)).await;

    assert!(!service.can_undo(&product.id).await);
    let err = service.undo_delete(OWNER, &product.id).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { .. }));
    assert!(service.product(&product.id).is_none());
}

#[tokio::test]
async fn undo_restores_unassigned_when_warehouse_is_gone() {
    let (service, _) = memory_service().await;
    let temp = add_warehouse(&service, "Temp").await;
    let product = add_product(&service, widget(3).in_warehouse("Temp")).await;

    service
        .execute(OWNER, Command::DeleteProduct { id: product.id.clone() })
        .await
        .unwrap();
    service
        .execute(OWNER, Command::DeleteWarehouse { id: temp.id.clone() })
        .await
        .unwrap();

    service.undo_delete(OWNER, &product.id).await.unwrap();
    assert_eq!(service.product(&product.id).unwrap().warehouse, None);
}

#[tokio::test]
async fn undo_survives_store_outage() {
    let store = Arc::new(FlakyStore::default());
    let service = InventoryService::open(store.clone()).await.unwrap();
    let product = add_product(&service, widget(3)).await;
    service
        .execute(OWNER, Command::DeleteProduct { id: product.id.clone() })
        .await
        .unwrap();

    store.set_failing(true).await;
    let err = service.undo_delete(OWNER, &product.id).await.unwrap_err();
    assert!(matches!(err, LedgerError::StoreUnavailable(_)));
    assert!(service.can_undo(&product.id).await);
    assert!(service.product(&product.id).is_none());

    store.set_failing(false).await;
    let receipt = service.undo_delete(OWNER, &product.id).await.unwrap();
    assert_eq!(receipt.audit.action, AuditAction::RestoreProduct);
    assert_eq!(service.product(&product.id).unwrap().quantity, 3);
    assert!(!service.can_undo(&product.id).await);
}

// =============================================================================
// Live subscriptions
// =============================================================================

#[tokio::test]
async fn subscription_follows_commands() {
    let (service, _) = memory_service().await;
    add_warehouse(&service, "Main").await;

    let mut stream = Box::pin(service.subscribe_products(ProductFilter {
        warehouse: Some("Main".into()),
        ..Default::default()
    }));

    let initial = stream.next().await.unwrap();
    assert!(initial.is_empty());

    let product = add_product(&service, widget(10).in_warehouse("Main")).await;
    let update = timeout(Duration::from_secs(1), stream.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(update.len(), 1);
    assert_eq!(update[0].id, product.id);

    service
        .execute(OWNER, Command::DeleteProduct { id: product.id.clone() })
        .await
        .unwrap();
    let update = timeout(Duration::from_secs(1), stream.next())
        .await
        .unwrap()
        .unwrap();
    assert!(update.is_empty());
}

#[tokio::test]
async fn warehouse_rename_keeps_products_attached() {
    let (service, _) = memory_service().await;
    let main = add_warehouse(&service, "Main").await;
    let product = add_product(&service, widget(10).in_warehouse("Main")).await;

    let receipt = service
        .execute(
            OWNER,
            Command::UpdateWarehouse {
                id: main.id.clone(),
                patch: WarehousePatch {
                    name: Some("Central".into()),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap();

    assert_eq!(receipt.audit.action, AuditAction::UpdateWarehouse);
    assert_eq!(
        service.product(&product.id).unwrap().warehouse.as_deref(),
        Some("Central")
    );
    assert_eq!(service.warehouse_stats("Central").product_count, 1);
}

#[tokio::test]
async fn warehouse_and_audit_subscriptions() {
    let (service, _) = memory_service().await;
    let mut warehouses = Box::pin(service.subscribe_warehouses("nyc"));
    let mut activity = Box::pin(service.subscribe_audit(AuditQuery::recent(5)));

    assert!(warehouses.next().await.unwrap().is_empty());
    assert!(activity.next().await.unwrap().is_empty());

    add_warehouse(&service, "Main").await;

    let listed = timeout(Duration::from_secs(1), warehouses.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Main");

    let entries = timeout(Duration::from_secs(1), activity.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditAction::AddWarehouse);
}

// =============================================================================
// Notifications
// =============================================================================

#[tokio::test]
async fn events_reach_channel_subscribers() {
    let channel = ChannelNotifier::new(32);
    let mut rx = channel.subscribe();
    let handle = NotificationDispatcher::spawn(vec![Arc::new(channel) as Arc<dyn Notifier>], 32);

    let (service, _) = memory_service().await;
    let service = service.with_notifications(handle);
    add_warehouse(&service, "Main").await;
    let product = add_product(&service, widget(10).in_warehouse("Main")).await;
    service
        .execute(
            OWNER,
            Command::AdjustStock {
                id: product.id.clone(),
                delta: -8,
            },
        )
        .await
        .unwrap();

    let mut received = Vec::new();
    for _ in 0..4 {
        let event = timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        received.push(event);
    }

    assert_eq!(received[0].title, "Warehouse added");
    assert_eq!(received[0].body, "Main warehouse created.");
    assert_eq!(received[1].title, "Product added");
    assert_eq!(received[2].title, "Stock adjusted");
    assert_eq!(received[3].kind, EventKind::LowStock);
    assert!(received[3].body.contains("Quantity: 2"));

    service.shutdown().await;
}

// =============================================================================
// SQLite
// =============================================================================

#[tokio::test]
async fn sqlite_service_survives_reopen() {
    let db = Arc::new(Database::new(DbConfig::in_memory()).await.unwrap());

    let first = InventoryService::open(db.clone()).await.unwrap();
    add_warehouse(&first, "Main").await;
    let product = add_product(&first, widget(10).in_warehouse("Main")).await;
    first
        .execute(
            OWNER,
            Command::AdjustStock {
                id: product.id.clone(),
                delta: -4,
            },
        )
        .await
        .unwrap();
    let expected_audit = first.audit(&AuditQuery::default());
    drop(first);

    let second = InventoryService::open(db.clone()).await.unwrap();
    assert_eq!(second.product(&product.id).unwrap().quantity, 6);
    assert_eq!(second.audit(&AuditQuery::default()), expected_audit);

    let row = db.products().get_by_id(&product.id).await.unwrap().unwrap();
    assert_eq!(row.quantity, 6);
}

// =============================================================================
// Product codes
// =============================================================================

#[tokio::test]
async fn backfill_gives_legacy_products_codes() {
    let (service, _) = memory_service().await;
    let first = add_product(&service, widget(1)).await;
    add_product(&service, widget(2).with_code("PROD-002")).await;
    let third = add_product(&service, widget(3)).await;

    let updated = service.backfill_product_codes(OWNER).await.unwrap();
    assert_eq!(updated.len(), 2);
    assert_eq!(
        service.product(&first.id).unwrap().product_code.as_deref(),
        Some("PROD-003")
    );
    assert_eq!(
        service.product(&third.id).unwrap().product_code.as_deref(),
        Some("PROD-004")
    );

    let updates = service.audit(&AuditQuery::default().by_action(AuditAction::UpdateProduct));
    assert_eq!(updates.len(), 2);

    // Nothing left to do the second time.
    assert!(service.backfill_product_codes(OWNER).await.unwrap().is_empty());
}
