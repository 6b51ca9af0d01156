//! # Catalog Store
//!
//! Current products and warehouses, held in memory.
//!
//! The catalog enforces nothing on its own: it is a plain container that the
//! [`Ledger`](crate::ledger::Ledger) mutates only through [`Mutation`]s it has
//! already validated. Reads are cheap and never fail.
//!
//! ## Keys
//! ```text
//! products    BTreeMap<id, Product>      ── warehouse: Option<name> ──┐
//! warehouses  BTreeMap<id, Warehouse>    ◄── looked up by name ───────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Product, Warehouse};
use crate::{LOW_STOCK_THRESHOLD, PRODUCT_CODE_PREFIX};

// =============================================================================
// Mutation
// =============================================================================

/// One entity-level write. A commit is a list of these plus one audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// Insert or replace a product (keyed by `id`).
    PutProduct(Product),
    RemoveProduct { id: String },
    /// Insert or replace a warehouse (keyed by `id`).
    PutWarehouse(Warehouse),
    RemoveWarehouse { id: String },
}

// =============================================================================
// Queries
// =============================================================================

/// Inventory list filter. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ProductFilter {
    /// Case-insensitive substring of the product name.
    pub search: Option<String>,
    /// Exact category.
    pub category: Option<String>,
    /// Exact warehouse name.
    pub warehouse: Option<String>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        let search_ok = match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => product
                .name
                .to_lowercase()
                .contains(&term.to_lowercase()),
            _ => true,
        };
        let category_ok = self
            .category
            .as_deref()
            .map_or(true, |c| product.category == c);
        let warehouse_ok = self
            .warehouse
            .as_deref()
            .map_or(true, |w| product.is_in(w));

        search_ok && category_ok && warehouse_ok
    }
}

/// Aggregates for one warehouse card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WarehouseStats {
    pub warehouse: String,
    pub product_count: usize,
    pub total_quantity: i64,
    /// Sum of `purchasePrice × quantity`.
    pub stock_value: Money,
}

/// Dashboard headline numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InventorySummary {
    pub total_products: usize,
    pub low_stock: usize,
    /// Distinct warehouses that hold at least one product.
    pub warehouses_in_use: usize,
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: BTreeMap<String, Product>,
    warehouses: BTreeMap<String, Warehouse>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from loaded rows. Later duplicates of an id win.
    pub fn from_parts(products: Vec<Product>, warehouses: Vec<Warehouse>) -> Self {
        Catalog {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
            warehouses: warehouses
                .into_iter()
                .map(|w| (w.id.clone(), w))
                .collect(),
        }
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    pub fn warehouse(&self, id: &str) -> Option<&Warehouse> {
        self.warehouses.get(id)
    }

    pub fn warehouse_by_name(&self, name: &str) -> Option<&Warehouse> {
        self.warehouses.values().find(|w| w.name == name)
    }

    pub fn product_by_code(&self, code: &str) -> Option<&Product> {
        self.products
            .values()
            .find(|p| p.product_code.as_deref() == Some(code))
    }

    /// All products in id order.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// All warehouses in id order.
    pub fn warehouses(&self) -> impl Iterator<Item = &Warehouse> {
        self.warehouses.values()
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    pub fn warehouse_count(&self) -> usize {
        self.warehouses.len()
    }

    pub fn products_in_warehouse<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Product> {
        self.products.values().filter(move |p| p.is_in(name))
    }

    /// Whether any product references the named warehouse.
    pub fn is_warehouse_in_use(&self, name: &str) -> bool {
        self.products.values().any(|p| p.is_in(name))
    }

    // -------------------------------------------------------------------------
    // Listings
    // -------------------------------------------------------------------------

    /// Products matching `filter`, ordered by name (then id).
    pub fn filter_products(&self, filter: &ProductFilter) -> Vec<Product> {
        let mut out: Vec<Product> = self
            .products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        out
    }

    /// Warehouses whose name or location contains `term` (case-insensitive),
    /// ordered by name. An empty term lists them all.
    pub fn search_warehouses(&self, term: &str) -> Vec<Warehouse> {
        let term = term.trim().to_lowercase();
        let mut out: Vec<Warehouse> = self
            .warehouses
            .values()
            .filter(|w| {
                term.is_empty()
                    || w.name.to_lowercase().contains(&term)
                    || w.location.to_lowercase().contains(&term)
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// Products with no warehouse.
    pub fn unassigned_products(&self) -> Vec<&Product> {
        self.products
            .values()
            .filter(|p| p.warehouse.is_none())
            .collect()
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.products
            .values()
            .map(|p| p.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn warehouse_stats(&self, name: &str) -> WarehouseStats {
        let mut stats = WarehouseStats {
            warehouse: name.to_string(),
            product_count: 0,
            total_quantity: 0,
            stock_value: Money::zero(),
        };

        for product in self.products_in_warehouse(name) {
            stats.product_count += 1;
            stats.total_quantity = stats.total_quantity.saturating_add(product.quantity);
            stats.stock_value += product.stock_value();
        }

        stats
    }

    pub fn summary(&self) -> InventorySummary {
        let warehouses_in_use = self
            .products
            .values()
            .filter_map(|p| p.warehouse.as_deref())
            .collect::<BTreeSet<_>>()
            .len();

        InventorySummary {
            total_products: self.products.len(),
            low_stock: self
                .products
                .values()
                .filter(|p| p.quantity < LOW_STOCK_THRESHOLD)
                .count(),
            warehouses_in_use,
        }
    }

    /// Next free `PROD-NNN` code: one past the highest numeric suffix in use.
    ///
    /// ```rust
    /// use smartstock_core::Catalog;
    ///
    /// assert_eq!(Catalog::new().next_product_code(), "PROD-001");
    /// ```
    pub fn next_product_code(&self) -> String {
        let highest = self
            .products
            .values()
            .filter_map(|p| p.product_code.as_deref())
            .filter_map(|code| code.strip_prefix(PRODUCT_CODE_PREFIX))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);

        format!("{}{:03}", PRODUCT_CODE_PREFIX, highest.saturating_add(1))
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Applies one validated write.
    pub fn apply(&mut self, mutation: &Mutation) {
        match mutation {
            Mutation::PutProduct(product) => {
                self.products.insert(product.id.clone(), product.clone());
            }
            Mutation::RemoveProduct { id } => {
                self.products.remove(id);
            }
            Mutation::PutWarehouse(warehouse) => {
                self.warehouses
                    .insert(warehouse.id.clone(), warehouse.clone());
            }
            Mutation::RemoveWarehouse { id } => {
                self.warehouses.remove(id);
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
