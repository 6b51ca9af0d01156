//! # Product Repository
//!
//! Database operations for products.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use smartstock_core::Product;

const SELECT_PRODUCT: &str = r#"
    SELECT
        id,
        product_code,
        name,
        category,
        quantity,
        purchase_price,
        selling_price,
        warehouse,
        created_at,
        created_by,
        updated_at,
        last_updated_by
    FROM products
"#;

// =============================================================================
// Connection-level helpers (usable inside a transaction)
// =============================================================================

/// Inserts a product or replaces the row with the same id.
pub async fn upsert(conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
    debug!(id = %product.id, name = %product.name, quantity = product.quantity, "Upserting product");

    sqlx::query(
        r#"
        INSERT INTO products (
            id, product_code, name, category, quantity,
            purchase_price, selling_price, warehouse,
            created_at, created_by, updated_at, last_updated_by
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        ON CONFLICT(id) DO UPDATE SET
            product_code    = excluded.product_code,
            name            = excluded.name,
            category        = excluded.category,
            quantity        = excluded.quantity,
            purchase_price  = excluded.purchase_price,
            selling_price   = excluded.selling_price,
            warehouse       = excluded.warehouse,
            updated_at      = excluded.updated_at,
            last_updated_by = excluded.last_updated_by
        "#,
    )
    .bind(&product.id)
    .bind(&product.product_code)
    .bind(&product.name)
    .bind(&product.category)
    .bind(product.quantity)
    .bind(product.purchase_price)
    .bind(product.selling_price)
    .bind(&product.warehouse)
    .bind(product.created_at)
    .bind(&product.created_by)
    .bind(product.updated_at)
    .bind(&product.last_updated_by)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Deletes a product row. Missing rows are an error.
pub async fn delete(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
    debug!(id = %id, "Deleting product");

    let result = sqlx::query("DELETE FROM products WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Product", id));
    }

    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let in_main = repo.list_by_warehouse("Main").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// All products ordered by name.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} ORDER BY name, id"))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Loaded products");
        Ok(products)
    }

    /// Gets a product by its id.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its user-facing code ("PROD-001").
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let product =
            sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE product_code = ?1"))
                .bind(code)
                .fetch_optional(&self.pool)
                .await?;

        Ok(product)
    }

    /// Products held by the named warehouse, ordered by name.
    pub async fn list_by_warehouse(&self, warehouse: &str) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "{SELECT_PRODUCT} WHERE warehouse = ?1 ORDER BY name, id"
        ))
        .bind(warehouse)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Products below `threshold` units, lowest stock first.
    pub async fn list_low_stock(&self, threshold: i64) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "{SELECT_PRODUCT} WHERE quantity < ?1 ORDER BY quantity, name"
        ))
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Writes a product outside a ledger commit (seeding, repair).
    pub async fn upsert(&self, product: &Product) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        upsert(&mut conn, product).await
    }
}
