//! SQLite Store - ConversationStore backed by a SQLite database.
//!
//! Each conversation is one row: the id plus the full record serialized as
//! JSON. Saving replaces the row; the record is small enough that whole-row
//! replacement beats a normalized schema for this access pattern.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

use crate::domain::foundation::ConversationId;
use crate::ports::{ConversationRecord, ConversationStore, StoreError};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    record TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

/// Durable conversation store over SQLite.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connects to the database and ensures the schema exists.
    ///
    /// `url` follows sqlx conventions, e.g. `sqlite://conversations.db` or
    /// `sqlite::memory:`.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| StoreError::unavailable(format!("Failed to connect: {}", e)))?;

        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| StoreError::unavailable(format!("Failed to create schema: {}", e)))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl ConversationStore for SqliteStore {
    async fn load(&self, id: &ConversationId) -> Result<Option<ConversationRecord>, StoreError> {
        let row = sqlx::query("SELECT record FROM conversations WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::unavailable(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let json: String = row
            .try_get("record")
            .map_err(|e| StoreError::unavailable(e.to_string()))?;

        let record = serde_json::from_str(&json)
            .map_err(|e| StoreError::corrupt(id.as_str(), e.to_string()))?;

        Ok(Some(record))
    }

    async fn save(&self, record: &ConversationRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string(record)
            .map_err(|e| StoreError::corrupt(record.id.as_str(), e.to_string()))?;

        sqlx::query(
            "INSERT INTO conversations (id, record, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET record = excluded.record,
                                           updated_at = excluded.updated_at",
        )
        .bind(record.id.as_str())
        .bind(json)
        .bind(record.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::unavailable(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, id: &ConversationId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::unavailable(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
