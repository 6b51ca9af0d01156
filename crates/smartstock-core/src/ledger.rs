//! # Ledger Engine
//!
//! The single authority for changing the catalog.
//!
//! ## Two-Phase Commands
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Command ──► prepare(&self) ──► Commit ──► (store persists it) ──┐     │
//! │              validate only       mutations                        │     │
//! │              no state change     + ONE audit entry                │     │
//! │                                  + events                         │     │
//! │                                                                   ▼     │
//! │                                   Receipt ◄── apply(&mut self) ◄──┘     │
//! │                                               revision check,           │
//! │                                               mutations + audit land    │
//! │                                               together                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A [`Commit`] is stamped with the ledger revision it was prepared against.
//! Applying it after any other commit landed fails `PreconditionFailed`, so a
//! caller can never apply a decision made on stale state. [`Ledger::execute`]
//! runs both phases back to back for callers with nothing to persist.
//!
//! ## Rules Enforced
//! - Quantity never goes below zero (adjustments floor at zero)
//! - Products only point at warehouses that exist when the link is made
//! - A warehouse still holding products cannot be deleted
//! - Selling price strictly above purchase price at creation
//! - Exactly one audit entry per accepted command

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::alert::{crosses_low_stock, LowStockMessage};
use crate::audit::AuditLog;
use crate::catalog::{Catalog, Mutation};
use crate::command::{Command, NewProduct, NewWarehouse, ProductPatch, StockTransfer, WarehousePatch};
use crate::error::{LedgerError, LedgerResult, ValidationError};
use crate::types::{AuditAction, AuditEntry, Event, Product, ProductSnapshot, Warehouse};
use crate::validation::{
    normalize_optional, validate_delta, validate_price, validate_price_order,
    validate_product_code, validate_required, validate_stock_quantity,
    validate_transfer_quantity,
};
use crate::{DEFAULT_MANAGER, LOW_STOCK_THRESHOLD};

// =============================================================================
// Commit / Receipt
// =============================================================================

/// What a command produced for its caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    Product(Product),
    Warehouse(Warehouse),
    /// The removed product, kept so the caller can offer an undo.
    ProductDeleted(ProductSnapshot),
    WarehouseDeleted(Warehouse),
}

/// A validated, not yet applied, command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Ledger revision this commit was prepared against.
    pub revision: u64,
    pub mutations: Vec<Mutation>,
    pub audit: AuditEntry,
    pub events: Vec<Event>,
    pub outcome: Outcome,
}

/// The result of an applied commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub outcome: Outcome,
    pub audit: AuditEntry,
    pub events: Vec<Event>,
    /// Ledger revision after the commit.
    pub revision: u64,
}

impl Receipt {
    pub fn product(&self) -> Option<&Product> {
        match &self.outcome {
            Outcome::Product(p) => Some(p),
            _ => None,
        }
    }

    pub fn warehouse(&self) -> Option<&Warehouse> {
        match &self.outcome {
            Outcome::Warehouse(w) | Outcome::WarehouseDeleted(w) => Some(w),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> Option<&ProductSnapshot> {
        match &self.outcome {
            Outcome::ProductDeleted(s) => Some(s),
            _ => None,
        }
    }
}

/// Everything needed to rebuild a ledger, as loaded from a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerState {
    pub products: Vec<Product>,
    pub warehouses: Vec<Warehouse>,
    pub audit_entries: Vec<AuditEntry>,
}

// =============================================================================
// Ledger
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    catalog: Catalog,
    audit: AuditLog,
    revision: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: LedgerState) -> Self {
        Ledger {
            catalog: Catalog::from_parts(state.products, state.warehouses),
            audit: AuditLog::from_entries(state.audit_entries),
            revision: 0,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Number of commits applied since construction.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Prepares and applies `command` in one step.
    pub fn execute(
        &mut self,
        actor: &str,
        command: Command,
        now: DateTime<Utc>,
    ) -> LedgerResult<Receipt> {
        let commit = self.prepare(actor, command, now)?;
        self.apply(commit)
    }

    /// Validates `command` against current state and describes its effect.
    ///
    /// Never changes the ledger.
    pub fn prepare(
        &self,
        actor: &str,
        command: Command,
        now: DateTime<Utc>,
    ) -> LedgerResult<Commit> {
        let actor = validate_required("user", actor)?;
        let cx = Context {
            ledger: self,
            actor,
            at: self.audit.next_timestamp(now),
        };

        match command {
            Command::CreateProduct(input) => cx.create_product(input),
            Command::UpdateProduct { id, patch } => cx.update_product(&id, patch),
            Command::AdjustStock { id, delta } => cx.adjust_stock(&id, delta),
            Command::DeleteProduct { id } => cx.delete_product(&id),
            Command::RestoreProduct { snapshot } => cx.restore_product(snapshot),
            Command::TransferStock(transfer) => cx.transfer_stock(transfer),
            Command::CreateWarehouse(input) => cx.create_warehouse(input),
            Command::UpdateWarehouse { id, patch } => cx.update_warehouse(&id, patch),
            Command::DeleteWarehouse { id } => cx.delete_warehouse(&id),
            Command::AssignWarehouse { id, warehouse } => cx.assign_warehouse(&id, &warehouse),
        }
    }

    /// Applies a prepared commit: every mutation and its audit entry, or
    /// nothing when the ledger moved on since `prepare`.
    pub fn apply(&mut self, commit: Commit) -> LedgerResult<Receipt> {
        if commit.revision != self.revision {
            return Err(LedgerError::PreconditionFailed(format!(
                "ledger changed since the command was prepared (revision {} is now {})",
                commit.revision, self.revision
            )));
        }

        for mutation in &commit.mutations {
            self.catalog.apply(mutation);
        }
        self.audit.append(commit.audit.clone());
        self.revision += 1;

        Ok(Receipt {
            outcome: commit.outcome,
            audit: commit.audit,
            events: commit.events,
            revision: self.revision,
        })
    }
}

// =============================================================================
// Command Handlers
// =============================================================================

/// One command's view of the ledger: who, when, and the state it reads.
struct Context<'a> {
    ledger: &'a Ledger,
    actor: String,
    at: DateTime<Utc>,
}

impl Context<'_> {
    fn catalog(&self) -> &Catalog {
        &self.ledger.catalog
    }

    fn commit(
        &self,
        mutations: Vec<Mutation>,
        audit: AuditEntry,
        events: Vec<Event>,
        outcome: Outcome,
    ) -> LedgerResult<Commit> {
        Ok(Commit {
            revision: self.ledger.revision,
            mutations,
            audit,
            events,
            outcome,
        })
    }

    fn audit_entry(&self, action: AuditAction, name: impl Into<String>, quantity: i64) -> AuditEntry {
        AuditEntry {
            id: Uuid::new_v4().to_string(),
            user: self.actor.clone(),
            action,
            product_name: name.into(),
            quantity,
            timestamp: self.at,
        }
    }

    fn product(&self, id: &str) -> LedgerResult<&Product> {
        self.catalog()
            .product(id)
            .ok_or_else(|| LedgerError::not_found("Product", id))
    }

    fn warehouse_named(&self, name: &str) -> LedgerResult<&Warehouse> {
        self.catalog()
            .warehouse_by_name(name)
            .ok_or_else(|| LedgerError::not_found("Warehouse", name))
    }

    /// Stamps provenance on a product about to be written.
    fn touch(&self, mut product: Product) -> Product {
        product.updated_at = self.at;
        product.last_updated_by = Some(self.actor.clone());
        product
    }

    fn ensure_code_free(&self, code: Option<&str>, except_id: &str) -> LedgerResult<()> {
        if let Some(code) = code {
            if let Some(other) = self.catalog().product_by_code(code) {
                if other.id != except_id {
                    return Err(LedgerError::Conflict(format!(
                        "Product code '{code}' is already used by {}",
                        other.name
                    )));
                }
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    fn create_product(&self, input: NewProduct) -> LedgerResult<Commit> {
        let name = validate_required("name", &input.name)?;
        let category = validate_required("category", &input.category)?;
        validate_stock_quantity(input.quantity)?;
        validate_price("purchasePrice", input.purchase_price)?;
        validate_price("sellingPrice", input.selling_price)?;
        validate_price_order(input.purchase_price, input.selling_price)?;
        let code = validate_product_code(input.product_code.as_deref())?;
        let warehouse = normalize_optional(input.warehouse.as_deref());

        if let Some(w) = &warehouse {
            self.warehouse_named(w)?;
        }
        self.ensure_code_free(code.as_deref(), "")?;

        let product = Product {
            id: Uuid::new_v4().to_string(),
            product_code: code,
            name,
            category,
            quantity: input.quantity,
            purchase_price: input.purchase_price,
            selling_price: input.selling_price,
            warehouse,
            created_at: self.at,
            created_by: self.actor.clone(),
            updated_at: self.at,
            last_updated_by: Some(self.actor.clone()),
        };

        let mut events = vec![Event::crud(
            "Product added",
            format!("{} added to inventory.", product.name),
        )
        .for_product(&product.id)];
        if crosses_low_stock(None, product.quantity) {
            events.push(LowStockMessage::for_product(&product).into_event(&product.id));
        }

        self.commit(
            vec![Mutation::PutProduct(product.clone())],
            self.audit_entry(AuditAction::AddProduct, &product.name, product.quantity),
            events,
            Outcome::Product(product),
        )
    }

    fn update_product(&self, id: &str, patch: ProductPatch) -> LedgerResult<Commit> {
        let name = patch
            .name
            .as_deref()
            .map(|n| validate_required("name", n))
            .transpose()?;
        let category = patch
            .category
            .as_deref()
            .map(|c| validate_required("category", c))
            .transpose()?;
        if let Some(price) = patch.purchase_price {
            validate_price("purchasePrice", price)?;
        }
        if let Some(price) = patch.selling_price {
            validate_price("sellingPrice", price)?;
        }
        let code = patch
            .product_code
            .as_deref()
            .map(|c| validate_product_code(Some(c)))
            .transpose()?;

        let mut product = self.product(id)?.clone();
        if let Some(code) = code {
            self.ensure_code_free(code.as_deref(), &product.id)?;
            product.product_code = code;
        }
        if let Some(name) = name {
            product.name = name;
        }
        if let Some(category) = category {
            product.category = category;
        }
        if let Some(price) = patch.purchase_price {
            product.purchase_price = price;
        }
        if let Some(price) = patch.selling_price {
            product.selling_price = price;
        }
        let product = self.touch(product);

        self.commit(
            vec![Mutation::PutProduct(product.clone())],
            self.audit_entry(AuditAction::UpdateProduct, &product.name, product.quantity),
            vec![Event::crud("Product updated", format!("{} updated.", product.name))
                .for_product(&product.id)],
            Outcome::Product(product),
        )
    }

    fn adjust_stock(&self, id: &str, delta: i64) -> LedgerResult<Commit> {
        validate_delta(delta)?;

        let mut product = self.product(id)?.clone();
        product.quantity = product.quantity.saturating_add(delta).max(0);
        let product = self.touch(product);

        let mut events = vec![Event::crud(
            "Stock adjusted",
            format!("{} stock is now {}.", product.name, product.quantity),
        )
        .for_product(&product.id)];
        if product.quantity < LOW_STOCK_THRESHOLD {
            events.push(LowStockMessage::for_product(&product).into_event(&product.id));
        }

        self.commit(
            vec![Mutation::PutProduct(product.clone())],
            self.audit_entry(AuditAction::StockAdjust, &product.name, product.quantity),
            events,
            Outcome::Product(product),
        )
    }

    fn delete_product(&self, id: &str) -> LedgerResult<Commit> {
        let product = self.product(id)?.clone();
        let audit = self.audit_entry(AuditAction::DeleteProduct, &product.name, product.quantity);
        let event = Event::crud(
            "Product deleted",
            format!("{} removed from inventory.", product.name),
        )
        .for_product(&product.id);

        self.commit(
            vec![Mutation::RemoveProduct {
                id: product.id.clone(),
            }],
            audit,
            vec![event],
            Outcome::ProductDeleted(ProductSnapshot {
                product,
                deleted_at: self.at,
            }),
        )
    }

    fn restore_product(&self, snapshot: ProductSnapshot) -> LedgerResult<Commit> {
        let mut product = snapshot.product;

        // Snapshots arrive from callers too. Price order is not re-checked:
        // an UpdateProduct may have inverted it before the delete.
        product.name = validate_required("name", &product.name)?;
        product.category = validate_required("category", &product.category)?;
        validate_stock_quantity(product.quantity)?;
        validate_price("purchasePrice", product.purchase_price)?;
        validate_price("sellingPrice", product.selling_price)?;

        if self.catalog().product(&product.id).is_some() {
            return Err(LedgerError::Conflict(format!(
                "Product {} is already present",
                product.id
            )));
        }
        self.ensure_code_free(product.product_code.as_deref(), &product.id)?;

        // The warehouse may have been deleted or renamed while the product was gone.
        if let Some(w) = &product.warehouse {
            if self.catalog().warehouse_by_name(w).is_none() {
                product.warehouse = None;
            }
        }
        let product = self.touch(product);

        let mut events = vec![Event::crud("Product restored", format!("{} restored.", product.name))
            .for_product(&product.id)];
        if crosses_low_stock(None, product.quantity) {
            events.push(LowStockMessage::for_product(&product).into_event(&product.id));
        }

        self.commit(
            vec![Mutation::PutProduct(product.clone())],
            self.audit_entry(AuditAction::RestoreProduct, &product.name, product.quantity),
            events,
            Outcome::Product(product),
        )
    }

    fn transfer_stock(&self, transfer: StockTransfer) -> LedgerResult<Commit> {
        let from = validate_required("from", &transfer.from)?;
        let to = validate_required("to", &transfer.to)?;
        if from == to {
            return Err(ValidationError::SameWarehouse { name: from }.into());
        }
        validate_transfer_quantity(transfer.quantity)?;

        let product = self.product(&transfer.id)?;
        self.warehouse_named(&to)?;

        if !product.is_in(&from) {
            return Err(LedgerError::PreconditionFailed(format!(
                "{} is in {}, not {}",
                product.name,
                product.warehouse_label(),
                from
            )));
        }
        if product.quantity < transfer.quantity {
            return Err(ValidationError::InsufficientStock {
                available: product.quantity,
                requested: transfer.quantity,
            }
            .into());
        }

        let before = product.quantity;
        let mut product = product.clone();
        product.warehouse = Some(to.clone());
        product.quantity = transfer.quantity;
        let product = self.touch(product);

        let mut events = vec![Event::crud(
            "Stock transferred",
            format!(
                "{} units of {} moved from {} to {}.",
                transfer.quantity, product.name, from, to
            ),
        )
        .for_product(&product.id)];
        if crosses_low_stock(Some(before), product.quantity) {
            events.push(LowStockMessage::for_product(&product).into_event(&product.id));
        }

        self.commit(
            vec![Mutation::PutProduct(product.clone())],
            self.audit_entry(
                AuditAction::TransferStock,
                format!("{} from {} to {}", product.name, from, to),
                product.quantity,
            ),
            events,
            Outcome::Product(product),
        )
    }

    fn assign_warehouse(&self, id: &str, warehouse: &str) -> LedgerResult<Commit> {
        let warehouse = validate_required("warehouse", warehouse)?;

        let mut product = self.product(id)?.clone();
        self.warehouse_named(&warehouse)?;

        product.warehouse = Some(warehouse.clone());
        let product = self.touch(product);

        self.commit(
            vec![Mutation::PutProduct(product.clone())],
            self.audit_entry(
                AuditAction::AssignWarehouse,
                format!("{} to {}", product.name, warehouse),
                product.quantity,
            ),
            vec![Event::crud(
                "Product assigned",
                format!("{} assigned to {}", product.name, warehouse),
            )
            .for_product(&product.id)],
            Outcome::Product(product),
        )
    }

    // -------------------------------------------------------------------------
    // Warehouses
    // -------------------------------------------------------------------------

    fn create_warehouse(&self, input: NewWarehouse) -> LedgerResult<Commit> {
        let name = validate_required("name", &input.name)?;
        let location = validate_required("location", &input.location)?;

        if self.catalog().warehouse_by_name(&name).is_some() {
            return Err(LedgerError::Conflict(format!(
                "Warehouse '{name}' already exists"
            )));
        }

        let warehouse = Warehouse {
            id: Uuid::new_v4().to_string(),
            name,
            location,
            manager: normalize_optional(input.manager.as_deref())
                .unwrap_or_else(|| DEFAULT_MANAGER.to_string()),
            contact: normalize_optional(input.contact.as_deref()).unwrap_or_default(),
            created_at: self.at,
            created_by: self.actor.clone(),
        };

        self.commit(
            vec![Mutation::PutWarehouse(warehouse.clone())],
            self.audit_entry(AuditAction::AddWarehouse, &warehouse.name, 0),
            vec![Event::crud(
                "Warehouse added",
                format!("{} warehouse created.", warehouse.name),
            )],
            Outcome::Warehouse(warehouse),
        )
    }

    fn update_warehouse(&self, id: &str, patch: WarehousePatch) -> LedgerResult<Commit> {
        let name = patch
            .name
            .as_deref()
            .map(|n| validate_required("name", n))
            .transpose()?;
        let location = patch
            .location
            .as_deref()
            .map(|l| validate_required("location", l))
            .transpose()?;

        let current = self
            .catalog()
            .warehouse(id)
            .ok_or_else(|| LedgerError::not_found("Warehouse", id))?;
        let old_name = current.name.clone();
        let mut warehouse = current.clone();

        if let Some(name) = name {
            if name != old_name && self.catalog().warehouse_by_name(&name).is_some() {
                return Err(LedgerError::Conflict(format!(
                    "Warehouse '{name}' already exists"
                )));
            }
            warehouse.name = name;
        }
        if let Some(location) = location {
            warehouse.location = location;
        }
        if let Some(manager) = patch.manager.as_deref() {
            warehouse.manager =
                normalize_optional(Some(manager)).unwrap_or_else(|| DEFAULT_MANAGER.to_string());
        }
        if let Some(contact) = patch.contact.as_deref() {
            warehouse.contact = normalize_optional(Some(contact)).unwrap_or_default();
        }

        let mut mutations = vec![Mutation::PutWarehouse(warehouse.clone())];
        if warehouse.name != old_name {
            // Products follow the rename in the same commit.
            mutations.extend(
                self.catalog()
                    .products_in_warehouse(&old_name)
                    .map(|p| {
                        let mut moved = p.clone();
                        moved.warehouse = Some(warehouse.name.clone());
                        Mutation::PutProduct(self.touch(moved))
                    }),
            );
        }

        self.commit(
            mutations,
            self.audit_entry(AuditAction::UpdateWarehouse, &warehouse.name, 0),
            vec![Event::crud(
                "Warehouse updated",
                format!("{} warehouse updated.", warehouse.name),
            )],
            Outcome::Warehouse(warehouse),
        )
    }

    fn delete_warehouse(&self, id: &str) -> LedgerResult<Commit> {
        let warehouse = self
            .catalog()
            .warehouse(id)
            .ok_or_else(|| LedgerError::not_found("Warehouse", id))?
            .clone();

        let held = self.catalog().products_in_warehouse(&warehouse.name).count();
        if held > 0 {
            return Err(LedgerError::Conflict(format!(
                "Warehouse '{}' still holds {} product(s)",
                warehouse.name, held
            )));
        }

        self.commit(
            vec![Mutation::RemoveWarehouse {
                id: warehouse.id.clone(),
            }],
            self.audit_entry(AuditAction::DeleteWarehouse, &warehouse.name, 0),
            vec![Event::crud(
                "Warehouse deleted",
                format!("{} warehouse removed.", warehouse.name),
            )],
            Outcome::WarehouseDeleted(warehouse),
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
