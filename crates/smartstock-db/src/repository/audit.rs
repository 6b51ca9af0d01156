//! # Audit Repository
//!
//! Append-only access to `audit_log`. There is no update or delete here and
//! the schema refuses both with triggers.
//!
//! Rows are ordered by `rowid` (insertion order) rather than by the text
//! timestamp, whose fractional-second width varies.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use smartstock_core::{AuditEntry, AuditQuery};

const SELECT_ENTRY: &str = r#"
    SELECT id, user, action, product_name, quantity, timestamp
    FROM audit_log
"#;

/// Appends one entry.
pub async fn append(conn: &mut SqliteConnection, entry: &AuditEntry) -> DbResult<()> {
    debug!(action = %entry.action, user = %entry.user, "Appending audit entry");

    sqlx::query(
        r#"
        INSERT INTO audit_log (id, user, action, product_name, quantity, timestamp)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.user)
    .bind(entry.action)
    .bind(&entry.product_name)
    .bind(entry.quantity)
    .bind(entry.timestamp)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Repository for the activity log.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    /// Every entry, oldest first.
    pub async fn list_all(&self) -> DbResult<Vec<AuditEntry>> {
        let entries = sqlx::query_as::<_, AuditEntry>(&format!("{SELECT_ENTRY} ORDER BY rowid"))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = entries.len(), "Loaded audit log");
        Ok(entries)
    }

    /// Entries matching `query`, newest first.
    pub async fn query(&self, query: &AuditQuery) -> DbResult<Vec<AuditEntry>> {
        // SQLite treats a negative LIMIT as "no limit".
        let limit = query
            .limit
            .map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));

        let entries = sqlx::query_as::<_, AuditEntry>(&format!(
            r#"{SELECT_ENTRY}
            WHERE (?1 IS NULL OR user = ?1)
              AND (?2 IS NULL OR action = ?2)
            ORDER BY rowid DESC
            LIMIT ?3"#
        ))
        .bind(query.user.as_deref())
        .bind(query.action)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_log")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
