//! # Low-Stock Alerts
//!
//! Threshold rules and the alert text handed to the notifier.
//!
//! ```text
//!   before ≥ 5 (or new)      after < 5
//!   ───────────────────  ──►  ─────────   = crossing, alert once
//!   before < 5               after < 5    = already low, stay quiet
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{Event, EventKind, Product};
use crate::LOW_STOCK_THRESHOLD;

/// Whether a write moving a product from `before` to `after` units crosses
/// into low stock. `before` is `None` for a product that did not exist.
///
/// ```rust
/// use smartstock_core::alert::crosses_low_stock;
///
/// assert!(crosses_low_stock(Some(5), 4));
/// assert!(crosses_low_stock(None, 0));
/// assert!(!crosses_low_stock(Some(3), 2));
/// assert!(!crosses_low_stock(Some(10), 5));
/// ```
pub fn crosses_low_stock(before: Option<i64>, after: i64) -> bool {
    after < LOW_STOCK_THRESHOLD && before.map_or(true, |b| b >= LOW_STOCK_THRESHOLD)
}

/// Subject line and plain-text body of a low-stock alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LowStockMessage {
    pub subject: String,
    pub text: String,
}

impl LowStockMessage {
    pub fn for_product(product: &Product) -> Self {
        let code = product
            .product_code
            .as_deref()
            .map(|c| format!(" ({c})"))
            .unwrap_or_default();
        let label = format!("{}{}", product.name, code);

        LowStockMessage {
            subject: format!("Low stock alert: {label}"),
            text: format!(
                "Low stock alert for {label}\nQuantity: {}\nWarehouse: {}\nThreshold: {}",
                product.quantity,
                product.warehouse_label(),
                LOW_STOCK_THRESHOLD
            ),
        }
    }

    /// The notifier event carrying this message.
    pub fn into_event(self, product_id: impl Into<String>) -> Event {
        Event {
            kind: EventKind::LowStock,
            title: self.subject,
            body: self.text,
            product_id: Some(product_id.into()),
        }
    }
}
