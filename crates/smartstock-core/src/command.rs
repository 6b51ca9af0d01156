//! # Commands
//!
//! Every mutation a caller can ask of the ledger. A command carries only
//! what the caller typed; the ledger fills in ids, timestamps and provenance.
//!
//! Commands are serialized with a `type` tag so a frontend can post them
//! as plain JSON:
//!
//! ```json
//! { "type": "AdjustStock", "id": "7f0c…", "delta": -3 }
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{AuditAction, ProductSnapshot};

/// A requested mutation with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type")]
#[ts(export)]
pub enum Command {
    CreateProduct(NewProduct),
    UpdateProduct { id: String, patch: ProductPatch },
    /// Adds `delta` to the quantity, flooring at zero.
    AdjustStock { id: String, delta: i64 },
    DeleteProduct { id: String },
    /// Re-inserts a product from the snapshot its deletion returned.
    RestoreProduct { snapshot: ProductSnapshot },
    TransferStock(StockTransfer),
    CreateWarehouse(NewWarehouse),
    UpdateWarehouse { id: String, patch: WarehousePatch },
    DeleteWarehouse { id: String },
    /// Points product `id` at the warehouse called `warehouse`.
    AssignWarehouse { id: String, warehouse: String },
}

impl Command {
    /// The audit action a successful run of this command records.
    pub const fn action(&self) -> AuditAction {
        match self {
            Command::CreateProduct(_) => AuditAction::AddProduct,
            Command::UpdateProduct { .. } => AuditAction::UpdateProduct,
            Command::AdjustStock { .. } => AuditAction::StockAdjust,
            Command::DeleteProduct { .. } => AuditAction::DeleteProduct,
            Command::RestoreProduct { .. } => AuditAction::RestoreProduct,
            Command::TransferStock(_) => AuditAction::TransferStock,
            Command::CreateWarehouse(_) => AuditAction::AddWarehouse,
            Command::UpdateWarehouse { .. } => AuditAction::UpdateWarehouse,
            Command::DeleteWarehouse { .. } => AuditAction::DeleteWarehouse,
            Command::AssignWarehouse { .. } => AuditAction::AssignWarehouse,
        }
    }
}

// =============================================================================
// Product Commands
// =============================================================================

/// Input for `CreateProduct`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewProduct {
    /// Optional user-facing code; blank is treated as absent.
    #[serde(rename = "productId", default)]
    pub product_code: Option<String>,
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub purchase_price: Money,
    pub selling_price: Money,
    #[serde(default)]
    pub warehouse: Option<String>,
}

impl NewProduct {
    /// An unassigned product without a code.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        quantity: i64,
        purchase_price: Money,
        selling_price: Money,
    ) -> Self {
        NewProduct {
            product_code: None,
            name: name.into(),
            category: category.into(),
            quantity,
            purchase_price,
            selling_price,
            warehouse: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.product_code = Some(code.into());
        self
    }

    pub fn in_warehouse(mut self, warehouse: impl Into<String>) -> Self {
        self.warehouse = Some(warehouse.into());
        self
    }
}

/// Partial edit for `UpdateProduct`. `None` leaves the field alone.
///
/// Quantity and warehouse are deliberately absent: they change only through
/// `AdjustStock`, `TransferStock` and `AssignWarehouse`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ProductPatch {
    /// New user-facing code. Blank removes it.
    #[serde(rename = "productId")]
    pub product_code: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub purchase_price: Option<Money>,
    pub selling_price: Option<Money>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.product_code.is_none()
            && self.name.is_none()
            && self.category.is_none()
            && self.purchase_price.is_none()
            && self.selling_price.is_none()
    }
}

/// Input for `TransferStock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockTransfer {
    /// Product id (not the user-facing code).
    pub id: String,
    /// Warehouse the caller believes currently holds the product.
    pub from: String,
    pub to: String,
    pub quantity: i64,
}

// =============================================================================
// Warehouse Commands
// =============================================================================

/// Input for `CreateWarehouse`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewWarehouse {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub manager: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
}

impl NewWarehouse {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        NewWarehouse {
            name: name.into(),
            location: location.into(),
            manager: None,
            contact: None,
        }
    }

    pub fn managed_by(mut self, manager: impl Into<String>, contact: impl Into<String>) -> Self {
        self.manager = Some(manager.into());
        self.contact = Some(contact.into());
        self
    }
}

/// Partial edit for `UpdateWarehouse`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct WarehousePatch {
    /// A new name; products pointing at the old name follow the rename.
    pub name: Option<String>,
    pub location: Option<String>,
    pub manager: Option<String>,
    pub contact: Option<String>,
}
