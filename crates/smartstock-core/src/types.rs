//! # Domain Types
//!
//! Core domain types used throughout SmartStock.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   Warehouse     │   │   AuditEntry    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  user           │       │
//! │  │  productId      │   │  name (unique)  │   │  action         │       │
//! │  │  quantity ≥ 0   │   │  location       │   │  productName    │       │
//! │  │  warehouse ─────┼──►│  manager        │   │  quantity       │       │
//! │  │  (by name)      │   │  contact        │   │  timestamp      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │ ProductSnapshot │   │     Event       │                             │
//! │  │  (undo delete)  │   │  Crud/LowStock  │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! - `id`: UUID v4 - immutable, used by the ledger and the database
//! - Business key: `productId` ("PROD-001") for products, `name` for
//!   warehouses. Products reference warehouses by name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::money::Money;
use crate::LOW_STOCK_THRESHOLD;

// =============================================================================
// Product
// =============================================================================

/// A stocked product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// User-facing code such as "PROD-001". Legacy records may lack one.
    #[serde(rename = "productId")]
    pub product_code: Option<String>,

    pub name: String,

    pub category: String,

    /// Units on hand. Never negative.
    pub quantity: i64,

    pub purchase_price: Money,

    pub selling_price: Money,

    /// Name of the warehouse holding this product, `None` when unassigned.
    pub warehouse: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    pub created_by: String,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    pub last_updated_by: Option<String>,
}

impl Product {
    /// Whether the product is below the low-stock threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity < LOW_STOCK_THRESHOLD
    }

    /// Stock value at purchase price.
    #[inline]
    pub fn stock_value(&self) -> Money {
        self.purchase_price.multiply_quantity(self.quantity)
    }

    /// Whether the product is held by the named warehouse.
    #[inline]
    pub fn is_in(&self, warehouse: &str) -> bool {
        self.warehouse.as_deref() == Some(warehouse)
    }

    /// Warehouse name for display, "Unassigned" when unset.
    pub fn warehouse_label(&self) -> &str {
        self.warehouse.as_deref().unwrap_or(crate::UNASSIGNED_LABEL)
    }
}

/// A deleted product retained for undo.
///
/// The ledger hands one out on `DeleteProduct`; whoever holds it decides how
/// long `RestoreProduct` stays possible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductSnapshot {
    pub product: Product,

    #[ts(as = "String")]
    pub deleted_at: DateTime<Utc>,
}

// =============================================================================
// Warehouse
// =============================================================================

/// A storage location. Its `name` is the join key products use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Warehouse {
    pub id: String,
    pub name: String,
    pub location: String,
    pub manager: String,
    pub contact: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

// =============================================================================
// Audit
// =============================================================================

/// The closed set of audited actions.
///
/// Serialized with the exact labels the activity log has always shown
/// ("ADD PRODUCT", "TRANSFER STOCK", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum AuditAction {
    #[serde(rename = "ADD PRODUCT")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "ADD PRODUCT"))]
    AddProduct,
    #[serde(rename = "UPDATE PRODUCT")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "UPDATE PRODUCT"))]
    UpdateProduct,
    #[serde(rename = "DELETE PRODUCT")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "DELETE PRODUCT"))]
    DeleteProduct,
    #[serde(rename = "RESTORE PRODUCT")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "RESTORE PRODUCT"))]
    RestoreProduct,
    #[serde(rename = "STOCK ADJUST")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "STOCK ADJUST"))]
    StockAdjust,
    #[serde(rename = "TRANSFER STOCK")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "TRANSFER STOCK"))]
    TransferStock,
    #[serde(rename = "ADD WAREHOUSE")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "ADD WAREHOUSE"))]
    AddWarehouse,
    #[serde(rename = "UPDATE WAREHOUSE")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "UPDATE WAREHOUSE"))]
    UpdateWarehouse,
    #[serde(rename = "DELETE WAREHOUSE")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "DELETE WAREHOUSE"))]
    DeleteWarehouse,
    #[serde(rename = "ASSIGN WAREHOUSE")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "ASSIGN WAREHOUSE"))]
    AssignWarehouse,
}

impl AuditAction {
    /// Every action, in the order the activity log filter lists them.
    pub const ALL: [AuditAction; 10] = [
        AuditAction::AddProduct,
        AuditAction::UpdateProduct,
        AuditAction::DeleteProduct,
        AuditAction::RestoreProduct,
        AuditAction::StockAdjust,
        AuditAction::TransferStock,
        AuditAction::AddWarehouse,
        AuditAction::UpdateWarehouse,
        AuditAction::DeleteWarehouse,
        AuditAction::AssignWarehouse,
    ];

    /// The stored label.
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuditAction::AddProduct => "ADD PRODUCT",
            AuditAction::UpdateProduct => "UPDATE PRODUCT",
            AuditAction::DeleteProduct => "DELETE PRODUCT",
            AuditAction::RestoreProduct => "RESTORE PRODUCT",
            AuditAction::StockAdjust => "STOCK ADJUST",
            AuditAction::TransferStock => "TRANSFER STOCK",
            AuditAction::AddWarehouse => "ADD WAREHOUSE",
            AuditAction::UpdateWarehouse => "UPDATE WAREHOUSE",
            AuditAction::DeleteWarehouse => "DELETE WAREHOUSE",
            AuditAction::AssignWarehouse => "ASSIGN WAREHOUSE",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown action label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown audit action: '{0}'")]
pub struct UnknownAction(pub String);

impl FromStr for AuditAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_uppercase().replace('_', " ");
        AuditAction::ALL
            .into_iter()
            .find(|a| a.as_str() == label)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// One immutable line of the activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AuditEntry {
    pub id: String,

    /// Who issued the command (email or uid).
    pub user: String,

    pub action: AuditAction,

    /// Product or warehouse the action concerned.
    pub product_name: String,

    /// Quantity after the action (not a delta). Zero for warehouse actions.
    pub quantity: i64,

    /// Assigned by the audit log; strictly increasing.
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Events
// =============================================================================

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum EventKind {
    /// A catalog change worth a toast / push notification.
    Crud,
    /// A product dropped below the low-stock threshold.
    LowStock,
}

/// A notification produced alongside a successful command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Event {
    pub kind: EventKind,
    pub title: String,
    pub body: String,
    /// Product concerned, when there is one.
    pub product_id: Option<String>,
}

impl Event {
    pub fn crud(title: impl Into<String>, body: impl Into<String>) -> Self {
        Event {
            kind: EventKind::Crud,
            title: title.into(),
            body: body.into(),
            product_id: None,
        }
    }

    pub fn for_product(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(quantity: i64) -> Product {
        let now = Utc::now();
        Product {
            id: "p-1".into(),
            product_code: Some("PROD-001".into()),
            name: "Widget".into(),
            category: "Parts".into(),
            quantity,
            purchase_price: Money::from_cents(500),
            selling_price: Money::from_cents(800),
            warehouse: None,
            created_at: now,
            created_by: "owner@example.com".into(),
            updated_at: now,
            last_updated_by: None,
        }
    }

    #[test]
    fn test_low_stock_boundary() {
        assert!(product(4).is_low_stock());
        assert!(!product(5).is_low_stock());
    }

    #[test]
    fn test_stock_value_and_label() {
        let p = product(10);
        assert_eq!(p.stock_value(), Money::from_cents(5000));
        assert_eq!(p.warehouse_label(), "Unassigned");
        assert!(!p.is_in("Main"));
    }

    #[test]
    fn test_action_labels_round_trip_through_from_str() {
        for action in AuditAction::ALL {
            assert_eq!(action.as_str().parse::<AuditAction>().unwrap(), action);
        }
        assert_eq!(
            "transfer_stock".parse::<AuditAction>().unwrap(),
            AuditAction::TransferStock
        );
        assert!("SELL".parse::<AuditAction>().is_err());
    }

    #[test]
    fn test_action_serializes_with_label() {
        let json = serde_json::to_string(&AuditAction::StockAdjust).unwrap();
        assert_eq!(json, "\"STOCK ADJUST\"");
    }

    #[test]
    fn test_product_serializes_code_as_product_id() {
        let json = serde_json::to_value(product(3)).unwrap();
        assert_eq!(json["productId"], "PROD-001");
        assert_eq!(json["purchasePrice"], 500);
        assert!(json.get("product_code").is_none());
    }
}
