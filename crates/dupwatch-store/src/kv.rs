//! Key-value store implementations.
//!
//! The persisted namespace is flat: `config`, `embedding:<key>`,
//! `alert:<key>`, `ignore:<key>`. Values are opaque JSON owned by the typed
//! repositories layered on top.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::{Pool, Postgres, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;

use dupwatch_core::{Error, KeyValueStore, Result};

/// PostgreSQL implementation of [`KeyValueStore`] over the `kv_entry` table.
pub struct PgKeyValueStore {
    pool: Pool<Postgres>,
}

impl PgKeyValueStore {
    /// Create a new PgKeyValueStore with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for PgKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>> {
        let row = sqlx::query("SELECT value FROM kv_entry WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(|r| r.get::<JsonValue, _>("value")))
    }

    async fn set(&self, key: &str, value: JsonValue) -> Result<()> {
        sqlx::query(
            "INSERT INTO kv_entry (key, value, updated_at)
             VALUES ($1, $2, now())
             ON CONFLICT (key)
             DO UPDATE SET value = EXCLUDED.value, updated_at = now()",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_entry WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}

/// In-memory implementation of [`KeyValueStore`] for tests.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, JsonValue>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: JsonValue) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryKeyValueStore::new();
        store.set("alert:APP-1", json!([{"key": "APP-2"}])).await.unwrap();

        let value = store.get("alert:APP-1").await.unwrap();
        assert_eq!(value, Some(json!([{"key": "APP-2"}])));
    }

    #[tokio::test]
    async fn test_memory_store_get_absent() {
        let store = MemoryKeyValueStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_set_overwrites() {
        let store = MemoryKeyValueStore::new();
        store.set("config", json!({"a": 1})).await.unwrap();
        store.set("config", json!({"a": 2})).await.unwrap();

        assert_eq!(store.get("config").await.unwrap(), Some(json!({"a": 2})));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_memory_store_delete() {
        let store = MemoryKeyValueStore::new();
        store.set("ignore:APP-1", json!(["APP-2"])).await.unwrap();
        store.delete("ignore:APP-1").await.unwrap();

        assert_eq!(store.get("ignore:APP-1").await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_memory_store_delete_absent_is_noop() {
        let store = MemoryKeyValueStore::new();
        store.delete("missing").await.unwrap();
    }
}
