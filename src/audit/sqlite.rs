//! SQLite-backed audit store.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::audit::record::OperationRecord;
use crate::audit::store::{AuditError, AuditStore};

/// Append-only `operations` table.
#[derive(Clone)]
pub struct SqliteAuditStore {
    pool: SqlitePool,
}

impl SqliteAuditStore {
    /// Connect to `url`, creating the database file and table if missing.
    pub async fn connect(url: &str) -> Result<Self, AuditError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let max_connections = if url.contains(":memory:") { 1 } else { 8 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    /// Use an existing pool, creating the table if needed.
    pub async fn with_pool(pool: SqlitePool) -> Result<Self, AuditError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS operations (
                id TEXT PRIMARY KEY,
                operation TEXT NOT NULL,
                operands TEXT NOT NULL,
                result TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Number of stored records.
    pub async fn count(&self) -> Result<i64, AuditError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM operations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl AuditStore for SqliteAuditStore {
    async fn insert(&self, record: &OperationRecord) -> Result<(), AuditError> {
        let operands = serde_json::to_string(&record.operands)?;
        let result = serde_json::to_string(&record.result)?;

        sqlx::query(
            "INSERT INTO operations (id, operation, operands, result, timestamp)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(record.id.to_string())
        .bind(record.operation.as_str())
        .bind(operands)
        .bind(result)
        .bind(record.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
