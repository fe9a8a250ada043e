//! Per-item ignore lists: candidates the user has explicitly dismissed.
//!
//! An ignore list only grows. A dismissed target is never re-surfaced as an
//! alert for that source, even if a later scan rediscovers it.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use dupwatch_core::{Error, KeyValueStore, Result};

/// Storage key for a source item's ignore list.
pub fn ignore_key(item_key: &str) -> String {
    format!("ignore:{item_key}")
}

/// Ignore-list repository over the key-value store.
#[derive(Clone)]
pub struct IgnoreStore {
    store: Arc<dyn KeyValueStore>,
}

impl IgnoreStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Idempotently add `target_key` to the ignore list for `source_key`.
    pub async fn dismiss(&self, source_key: &str, target_key: &str) -> Result<()> {
        if source_key.trim().is_empty() || target_key.trim().is_empty() {
            return Err(Error::InvalidInput(
                "dismiss requires a source key and a target key".into(),
            ));
        }

        let mut list = self.list(source_key).await?;
        if list.iter().any(|k| k == target_key) {
            return Ok(());
        }
        list.push(target_key.to_string());

        info!(
            subsystem = "store",
            component = "ignores",
            item_key = %source_key,
            target = %target_key,
            "Candidate dismissed"
        );
        self.store.set(&ignore_key(source_key), json!(list)).await
    }

    /// True if `target_key` was dismissed for `source_key`.
    pub async fn is_ignored(&self, source_key: &str, target_key: &str) -> Result<bool> {
        Ok(self.list(source_key).await?.iter().any(|k| k == target_key))
    }

    /// All dismissed target keys for `source_key`.
    pub async fn list(&self, source_key: &str) -> Result<Vec<String>> {
        let value = self.store.get(&ignore_key(source_key)).await?;
        Ok(value
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default())
    }
}
