//! End-to-end ledger behaviour through `InventoryService` on a memory store.

mod common;

use common::{add_product, add_warehouse, memory_service, widget, OWNER};
use smartstock::LedgerStore;
use smartstock_core::command::{Command, ProductPatch, StockTransfer, WarehousePatch};
use smartstock_core::{
    AuditAction, AuditQuery, EventKind, LedgerError, Money, ProductFilter, ValidationError,
};

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn create_warehouse_then_product() {
    let (service, store) = memory_service().await;
    add_warehouse(&service, "Main").await;

    let receipt = service
        .execute(OWNER, Command::CreateProduct(widget(10).in_warehouse("Main")))
        .await
        .unwrap();

    let product = receipt.product().unwrap();
    assert_eq!(product.quantity, 10);
    assert_eq!(product.warehouse.as_deref(), Some("Main"));

    let adds = service
        .audit(&AuditQuery::default().by_action(AuditAction::AddProduct));
    assert_eq!(adds.len(), 1);
    assert_eq!(adds[0].quantity, 10);
    assert_eq!(adds[0].user, OWNER);

    // Persisted, not only in memory.
    assert_eq!(store.audit_len().await, 2);
    assert_eq!(store.load().await.unwrap().products.len(), 1);
}

#[tokio::test]
async fn large_negative_adjustment_clamps_to_zero() {
    let (service, _) = memory_service().await;
    let product = add_product(&service, widget(10)).await;

    let receipt = service
        .execute(
            OWNER,
            Command::AdjustStock {
                id: product.id.clone(),
                delta: -50,
            },
        )
        .await
        .unwrap();

    assert_eq!(receipt.product().unwrap().quantity, 0);
    assert_eq!(receipt.audit.action, AuditAction::StockAdjust);
    assert_eq!(receipt.audit.quantity, 0);
    assert!(receipt
        .events
        .iter()
        .any(|e| e.kind == EventKind::LowStock && e.product_id.as_deref() == Some(product.id.as_str())));
}

#[tokio::test]
async fn partial_transfer_moves_product_and_sets_quantity() {
    let (service, _) = memory_service().await;
    add_warehouse(&service, "Main").await;
    add_warehouse(&service, "Overflow").await;
    let product = add_product(&service, widget(10).in_warehouse("Main")).await;

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

    let moved = receipt.product().unwrap();
    assert_eq!(moved.warehouse.as_deref(), Some("Overflow"));
    assert_eq!(moved.quantity, 4);
    assert_eq!(receipt.audit.product_name, "Widget from Main to Overflow");
    assert_eq!(receipt.audit.quantity, 4);
    assert_eq!(service.warehouse_stats("Main").product_count, 0);
    assert_eq!(service.warehouse_stats("Overflow").total_quantity, 4);
}

#[tokio::test]
async fn deleting_occupied_warehouse_conflicts() {
    let (service, _) = memory_service().await;
    let main = add_warehouse(&service, "Main").await;
    add_product(&service, widget(10).in_warehouse("Main")).await;

    let err = service
        .execute(OWNER, Command::DeleteWarehouse { id: main.id.clone() })
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::Conflict(_)));
    assert!(service.catalog().warehouse(&main.id).is_some());
    assert!(service
        .audit(&AuditQuery::default().by_action(AuditAction::DeleteWarehouse))
        .is_empty());
}

#[tokio::test]
async fn equal_prices_rejected_on_create() {
    let (service, store) = memory_service().await;

    let err = service
        .execute(
            OWNER,
            Command::CreateProduct(smartstock_core::command::NewProduct::new(
                "Widget",
                "Tools",
                1,
                Money::from_cents(500),
                Money::from_cents(500),
            )),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LedgerError::Validation(ValidationError::PriceNotAboveCost { .. })
    ));
    assert_eq!(store.audit_len().await, 0);
}

// =============================================================================
// Properties
// =============================================================================

#[tokio::test]
async fn quantity_never_goes_negative() {
    let (service, _) = memory_service().await;
    let product = add_product(&service, widget(7)).await;

    let mut expected = 7i64;
    for delta in [-3, 12, -100, 1, -1, -1, 40, -39] {
        let receipt = service
            .execute(
                OWNER,
                Command::AdjustStock {
                    id: product.id.clone(),
                    delta,
                },
            )
            .await
            .unwrap();
        expected = (expected + delta).max(0);
        assert_eq!(receipt.product().unwrap().quantity, expected);
        assert!(expected >= 0);
    }
}

#[tokio::test]
async fn rejected_transfer_changes_nothing() {
    let (service, _) = memory_service().await;
    add_warehouse(&service, "Main").await;
    add_warehouse(&service, "Overflow").await;
    let product = add_product(&service, widget(3).in_warehouse("Main")).await;
    let audit_before = service.audit(&AuditQuery::default()).len();

    let attempts = [
        // More than on hand.
        StockTransfer {
            id: product.id.clone(),
            from: "Main".into(),
            to: "Overflow".into(),
            quantity: 4,
        },
        // Wrong source.
        StockTransfer {
            id: product.id.clone(),
            from: "Overflow".into(),
            to: "Main".into(),
            quantity: 1,
        },
        // Unknown destination.
        StockTransfer {
            id: product.id.clone(),
            from: "Main".into(),
            to: "Attic".into(),
            quantity: 1,
        },
    ];

    for transfer in attempts {
        assert!(service
            .execute(OWNER, Command::TransferStock(transfer))
            .await
            .is_err());
    }

    let unchanged = service.product(&product.id).unwrap();
    assert_eq!(unchanged.quantity, 3);
    assert_eq!(unchanged.warehouse.as_deref(), Some("Main"));
    assert_eq!(service.audit(&AuditQuery::default()).len(), audit_before);
}

#[tokio::test]
async fn warehouse_deletable_once_empty() {
    let (service, _) = memory_service().await;
    let main = add_warehouse(&service, "Main").await;
    add_warehouse(&service, "Overflow").await;
    let product = add_product(&service, widget(2).in_warehouse("Main")).await;

    service
        .execute(
            OWNER,
            Command::AssignWarehouse {
                id: product.id.clone(),
                warehouse: "Overflow".into(),
            },
        )
        .await
        .unwrap();

    let receipt = service
        .execute(OWNER, Command::DeleteWarehouse { id: main.id.clone() })
        .await
        .unwrap();
    assert_eq!(receipt.audit.action, AuditAction::DeleteWarehouse);
    assert!(service.catalog().warehouse_by_name("Main").is_none());
}

#[tokio::test]
async fn every_command_appends_exactly_one_matching_entry() {
    let (service, _) = memory_service().await;
    let main = add_warehouse(&service, "Main").await;
    add_warehouse(&service, "Overflow").await;
    let product = add_product(&service, widget(10).in_warehouse("Main")).await;

    let commands = vec![
        (
            Command::UpdateProduct {
                id: product.id.clone(),
                patch: ProductPatch {
                    category: Some("Hardware".into()),
                    ..Default::default()
                },
            },
            AuditAction::UpdateProduct,
            Some(10),
        ),
        (
            Command::AdjustStock {
                id: product.id.clone(),
                delta: 5,
            },
            AuditAction::StockAdjust,
            Some(15),
        ),
        (
            Command::TransferStock(StockTransfer {
                id: product.id.clone(),
                from: "Main".into(),
                to: "Overflow".into(),
                quantity: 15,
            }),
            AuditAction::TransferStock,
            Some(15),
        ),
        (
            Command::AssignWarehouse {
                id: product.id.clone(),
                warehouse: "Main".into(),
            },
            AuditAction::AssignWarehouse,
            Some(15),
        ),
        (
            Command::UpdateWarehouse {
                id: main.id.clone(),
                patch: WarehousePatch {
                    location: Some("Brooklyn".into()),
                    ..Default::default()
                },
            },
            AuditAction::UpdateWarehouse,
            Some(0),
        ),
        (
            Command::DeleteProduct {
                id: product.id.clone(),
            },
            AuditAction::DeleteProduct,
            Some(15),
        ),
        (
            Command::DeleteWarehouse {
                id: main.id.clone(),
            },
            AuditAction::DeleteWarehouse,
            Some(0),
        ),
    ];

    for (command, action, quantity) in commands {
        let before = service.audit(&AuditQuery::default()).len();
        let receipt = service.execute(OWNER, command).await.unwrap();
        let after = service.audit(&AuditQuery::default());

        assert_eq!(after.len(), before + 1, "{action}");
        assert_eq!(after[0], receipt.audit);
        assert_eq!(receipt.audit.action, action);
        if let Some(q) = quantity {
            assert_eq!(receipt.audit.quantity, q, "{action}");
        }
    }
}

#[tokio::test]
async fn creation_price_rule_holds_for_every_pair() {
    let (service, _) = memory_service().await;
    let prices = [1, 2, 499, 500, 501, 10_000];

    for purchase in prices {
        for selling in prices {
            let result = service
                .execute(
                    OWNER,
                    Command::CreateProduct(smartstock_core::command::NewProduct::new(
                        format!("Item {purchase}/{selling}"),
                        "Tools",
                        1,
                        Money::from_cents(purchase),
                        Money::from_cents(selling),
                    )),
                )
                .await;

            if selling > purchase {
                assert!(result.is_ok(), "{purchase} -> {selling}");
            } else {
                assert!(
                    matches!(result, Err(LedgerError::Validation(_))),
                    "{purchase} -> {selling}"
                );
            }
        }
    }
}

// =============================================================================
// Queries
// =============================================================================

#[tokio::test]
async fn filter_and_summary() {
    let (service, _) = memory_service().await;
    add_warehouse(&service, "Main").await;
    add_product(&service, widget(10).in_warehouse("Main")).await;
    add_product(
        &service,
        smartstock_core::command::NewProduct::new(
            "Gasket",
            "Parts",
            2,
            Money::from_cents(100),
            Money::from_cents(150),
        ),
    )
    .await;

    let in_main = service.products(&ProductFilter {
        warehouse: Some("Main".into()),
        ..Default::default()
    });
    assert_eq!(in_main.len(), 1);
    assert_eq!(in_main[0].name, "Widget");

    let searched = service.products(&ProductFilter {
        search: Some("GASK".into()),
        ..Default::default()
    });
    assert_eq!(searched.len(), 1);

    let summary = service.summary();
    assert_eq!(summary.total_products, 2);
    assert_eq!(summary.low_stock, 1);
    assert_eq!(summary.warehouses_in_use, 1);

    assert_eq!(service.categories(), vec!["Parts".to_string(), "Tools".to_string()]);
    assert_eq!(
        service.warehouse_stats("Main").stock_value,
        Money::from_cents(5_000)
    );
}

#[tokio::test]
async fn audit_queries_filter_by_user() {
    let (service, _) = memory_service().await;
    add_warehouse(&service, "Main").await;
    service
        .execute(
            "bob",
            Command::CreateWarehouse(smartstock_core::command::NewWarehouse::new(
                "Overflow", "NJ",
            )),
        )
        .await
        .unwrap();

    let bob = service.audit(&AuditQuery::default().by_user("bob"));
    assert_eq!(bob.len(), 1);
    assert_eq!(bob[0].product_name, "Overflow");

    let latest = service.audit(&AuditQuery::recent(1));
    assert_eq!(latest[0].user, "bob");
}
