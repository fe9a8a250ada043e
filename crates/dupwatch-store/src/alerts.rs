//! Persisted duplicate alerts, one list per source item.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use dupwatch_core::{defaults, AlertEntry, Error, KeyValueStore, Result};

/// Storage key for a source item's alert list.
pub fn alert_key(item_key: &str) -> String {
    format!("alert:{item_key}")
}

/// Alert repository over the key-value store.
#[derive(Clone)]
pub struct AlertStore {
    store: Arc<dyn KeyValueStore>,
}

impl AlertStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Replace the alert list for `source_key` wholesale.
    ///
    /// An empty `entries` deletes any existing alert: a clean backlog must
    /// not show stale alerts. The persisted list is capped at
    /// [`defaults::MAX_ALERT_ENTRIES`].
    pub async fn record(&self, source_key: &str, entries: &[AlertEntry]) -> Result<()> {
        if source_key.trim().is_empty() {
            return Err(Error::InvalidInput("source key must not be empty".into()));
        }

        let key = alert_key(source_key);
        if entries.is_empty() {
            debug!(
                subsystem = "store",
                component = "alerts",
                item_key = %source_key,
                "Clean scan, clearing stored alert"
            );
            return self.store.delete(&key).await;
        }

        let capped = &entries[..entries.len().min(defaults::MAX_ALERT_ENTRIES)];
        info!(
            subsystem = "store",
            component = "alerts",
            item_key = %source_key,
            result_count = capped.len(),
            "Recording duplicate alerts"
        );
        self.store.set(&key, json!(capped)).await
    }

    /// Fetch the alert list for `item_key`. Absent or unreadable entries
    /// yield an empty list.
    pub async fn get(&self, item_key: &str) -> Result<Vec<AlertEntry>> {
        let value = self.store.get(&alert_key(item_key)).await?;
        Ok(value
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default())
    }

    /// Delete the alert list for `item_key`.
    pub async fn clear(&self, item_key: &str) -> Result<()> {
        self.store.delete(&alert_key(item_key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKeyValueStore;

    fn entry(key: &str, score: f32, confidence: u8) -> AlertEntry {
        AlertEntry {
            key: key.to_string(),
            score,
            confidence,
        }
    }

    fn store() -> AlertStore {
        AlertStore::new(Arc::new(MemoryKeyValueStore::new()))
    }

    #[tokio::test]
    async fn test_record_and_get() {
        let alerts = store();
        alerts
            .record("APP-1", &[entry("APP-2", 0.92, 92)])
            .await
            .unwrap();

        let got = alerts.get("APP-1").await.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].key, "APP-2");
        assert_eq!(got[0].confidence, 92);
    }

    #[tokio::test]
    async fn test_record_replaces_wholesale() {
        let alerts = store();
        alerts
            .record("APP-1", &[entry("APP-2", 0.92, 92), entry("APP-3", 0.6, 70)])
            .await
            .unwrap();
        alerts.record("APP-1", &[entry("APP-4", 0.5, 55)]).await.unwrap();

        let got = alerts.get("APP-1").await.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].key, "APP-4");
    }

    #[tokio::test]
    async fn test_empty_record_deletes() {
        let alerts = store();
        alerts.record("APP-1", &[entry("APP-2", 0.92, 92)]).await.unwrap();
        alerts.record("APP-1", &[]).await.unwrap();

        assert!(alerts.get("APP-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_caps_entries() {
        let alerts = store();
        let entries: Vec<AlertEntry> = (0u8..6)
            .map(|i| entry(&format!("APP-{i}"), 0.9 - f32::from(i) * 0.05, 90 - i * 5))
            .collect();
        alerts.record("APP-1", &entries).await.unwrap();

        let got = alerts.get("APP-1").await.unwrap();
        assert_eq!(got.len(), defaults::MAX_ALERT_ENTRIES);
        assert_eq!(got[0].key, "APP-0");
    }

    #[tokio::test]
    async fn test_get_absent_is_empty() {
        let alerts = store();
        assert!(alerts.get("APP-9").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_empty_source_key_rejected() {
        let alerts = store();
        let err = alerts.record("", &[]).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
