//! # Key-Value Repository
//!
//! String-keyed text values in the `kv_store` table.
//!
//! ## Write Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  set(key, value)                                                        │
//! │                                                                         │
//! │  INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)        │
//! │  ON CONFLICT(key) DO UPDATE SET value = excluded.value, ...            │
//! │                                                                         │
//! │  • Whole value replaced, never patched                                 │
//! │  • Single statement, so a reader sees the old or the new value         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// A stored value together with its last write time.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct KeyValueEntry {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Repository for key-value operations.
#[derive(Debug, Clone)]
pub struct KeyValueRepository {
    pool: SqlitePool,
}

impl KeyValueRepository {
    /// Creates a new KeyValueRepository.
    pub fn new(pool: SqlitePool) -> Self {
        KeyValueRepository { pool }
    }

    /// Reads the value stored under `key`.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        debug!(key = %key, found = value.is_some(), "kv get");
        Ok(value)
    }

    /// Reads the value and metadata stored under `key`.
    pub async fn get_entry(&self, key: &str) -> DbResult<Option<KeyValueEntry>> {
        let entry = sqlx::query_as::<_, KeyValueEntry>(
            "SELECT key, value, updated_at FROM kv_store WHERE key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Writes `value` under `key`, replacing any previous value.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = value.len(), "kv set");
        Ok(())
    }

    /// Deletes `key`. Returns whether a row was removed.
    pub async fn remove(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        debug!(key = %key, removed = result.rows_affected(), "kv remove");
        Ok(result.rows_affected() > 0)
    }

    /// Lists all stored keys in lexical order.
    pub async fn keys(&self) -> DbResult<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM kv_store ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        Ok(keys)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};

    async fn repo() -> super::KeyValueRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.kv()
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let kv = repo().await;

        assert_eq!(kv.get("@GoMarketplace:products").await.unwrap(), None);
        assert_eq!(kv.get_entry("@GoMarketplace:products").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let kv = repo().await;

        kv.set("k", "[1,2]").await.unwrap();

        assert_eq!(kv.get("k").await.unwrap().as_deref(), Some("[1,2]"));

        let entry = kv.get_entry("k").await.unwrap().unwrap();
        assert_eq!(entry.key, "k");
        assert_eq!(entry.value, "[1,2]");
    }

    #[tokio::test]
    async fn test_set_overwrites_in_full() {
        let kv = repo().await;

        kv.set("k", "first value that is long").await.unwrap();
        kv.set("k", "x").await.unwrap();

        assert_eq!(kv.get("k").await.unwrap().as_deref(), Some("x"));
        assert_eq!(kv.keys().await.unwrap(), vec!["k".to_string()]);
    }

    #[tokio::test]
    async fn test_remove() {
        let kv = repo().await;

        kv.set("a", "1").await.unwrap();
        kv.set("b", "2").await.unwrap();

        assert!(kv.remove("a").await.unwrap());
        assert!(!kv.remove("a").await.unwrap());
        assert_eq!(kv.keys().await.unwrap(), vec!["b".to_string()]);
    }
}
