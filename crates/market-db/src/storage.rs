//! # Key-Value Store Abstraction
//!
//! The narrow interface the cart persists through.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    KeyValueStore                                        │
//! │                                                                         │
//! │   get_item(key)        → Option<String>                                │
//! │   set_item(key, value) → ()                                            │
//! │   remove_item(key)     → ()                                            │
//! │                                                                         │
//! │   Implementations:                                                      │
//! │   ├── KeyValueRepository  SQLite kv_store table (production)           │
//! │   ├── Database            delegates to db.kv()                         │
//! │   └── MemoryKeyValueStore HashMap, nothing survives the process        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The trait is object safe so the cart can hold an `Arc<dyn KeyValueStore>`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::kv::KeyValueRepository;

/// String-keyed storage of text values.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value under `key`, `None` if never written.
    async fn get_item(&self, key: &str) -> DbResult<Option<String>>;

    /// Replaces the value under `key`.
    async fn set_item(&self, key: &str, value: &str) -> DbResult<()>;

    /// Deletes `key`. Deleting a missing key is not an error.
    async fn remove_item(&self, key: &str) -> DbResult<()>;
}

#[async_trait]
impl KeyValueStore for KeyValueRepository {
    async fn get_item(&self, key: &str) -> DbResult<Option<String>> {
        self.get(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> DbResult<()> {
        self.set(key, value).await
    }

    async fn remove_item(&self, key: &str) -> DbResult<()> {
        self.remove(key).await.map(|_| ())
    }
}

#[async_trait]
impl KeyValueStore for Database {
    async fn get_item(&self, key: &str) -> DbResult<Option<String>> {
        self.kv().get(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> DbResult<()> {
        self.kv().set(key, value).await
    }

    async fn remove_item(&self, key: &str) -> DbResult<()> {
        self.kv().remove(key).await.map(|_| ())
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Process-local store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.into(), value.into());
        }
        store
    }

    fn lock(&self) -> DbResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| DbError::Internal("Memory store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get_item(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> DbResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> DbResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
