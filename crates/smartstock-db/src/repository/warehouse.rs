//! # Warehouse Repository
//!
//! Database operations for warehouses. Names are unique at the schema
//! level, matching the ledger's rule.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use smartstock_core::Warehouse;

const SELECT_WAREHOUSE: &str = r#"
    SELECT id, name, location, manager, contact, created_at, created_by
    FROM warehouses
"#;

/// Inserts a warehouse or replaces the row with the same id.
pub async fn upsert(conn: &mut SqliteConnection, warehouse: &Warehouse) -> DbResult<()> {
    debug!(id = %warehouse.id, name = %warehouse.name, "Upserting warehouse");

    sqlx::query(
        r#"
        INSERT INTO warehouses (id, name, location, manager, contact, created_at, created_by)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(id) DO UPDATE SET
            name     = excluded.name,
            location = excluded.location,
            manager  = excluded.manager,
            contact  = excluded.contact
        "#,
    )
    .bind(&warehouse.id)
    .bind(&warehouse.name)
    .bind(&warehouse.location)
    .bind(&warehouse.manager)
    .bind(&warehouse.contact)
    .bind(warehouse.created_at)
    .bind(&warehouse.created_by)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Deletes a warehouse row. Missing rows are an error.
pub async fn delete(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
    debug!(id = %id, "Deleting warehouse");

    let result = sqlx::query("DELETE FROM warehouses WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Warehouse", id));
    }

    Ok(())
}

/// Repository for warehouse database operations.
#[derive(Debug, Clone)]
pub struct WarehouseRepository {
    pool: SqlitePool,
}

impl WarehouseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        WarehouseRepository { pool }
    }

    /// All warehouses ordered by name.
    pub async fn list_all(&self) -> DbResult<Vec<Warehouse>> {
        let warehouses =
            sqlx::query_as::<_, Warehouse>(&format!("{SELECT_WAREHOUSE} ORDER BY name"))
                .fetch_all(&self.pool)
                .await?;

        debug!(count = warehouses.len(), "Loaded warehouses");
        Ok(warehouses)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Warehouse>> {
        let warehouse = sqlx::query_as::<_, Warehouse>(&format!("{SELECT_WAREHOUSE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(warehouse)
    }

    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Warehouse>> {
        let warehouse =
            sqlx::query_as::<_, Warehouse>(&format!("{SELECT_WAREHOUSE} WHERE name = ?1"))
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        Ok(warehouse)
    }

    /// Writes a warehouse outside a ledger commit (seeding, repair).
    pub async fn upsert(&self, warehouse: &Warehouse) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        upsert(&mut conn, warehouse).await
    }
}
