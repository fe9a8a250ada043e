//! Persisted scan configuration singleton.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use dupwatch_core::{KeyValueStore, Result, ScanConfig};

/// Storage key for the configuration singleton.
pub const CONFIG_KEY: &str = "config";

/// Configuration repository over the key-value store.
///
/// The pipeline never writes through this store; only the configuration
/// endpoints do. Callers load once per request and pass the value down.
#[derive(Clone)]
pub struct ConfigStore {
    store: Arc<dyn KeyValueStore>,
}

impl ConfigStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the scan configuration, falling back to defaults when the
    /// singleton is absent or unreadable. Missing fields take their
    /// defaults (serde-level), so older persisted shapes keep loading.
    pub async fn load(&self) -> Result<ScanConfig> {
        match self.store.get(CONFIG_KEY).await? {
            Some(value) => match serde_json::from_value(value) {
                Ok(cfg) => Ok(cfg),
                Err(e) => {
                    warn!(
                        subsystem = "store",
                        component = "config",
                        error = %e,
                        "Stored config unreadable, using defaults"
                    );
                    Ok(ScanConfig::default())
                }
            },
            None => Ok(ScanConfig::default()),
        }
    }

    /// Persist the scan configuration.
    pub async fn save(&self, config: &ScanConfig) -> Result<()> {
        info!(
            subsystem = "store",
            component = "config",
            scope = ?config.scope,
            auto_tag = config.auto_tag,
            auto_check = config.auto_check,
            "Saving scan configuration"
        );
        self.store.set(CONFIG_KEY, json!(config)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKeyValueStore;
    use dupwatch_core::ScanScope;

    fn store() -> (Arc<MemoryKeyValueStore>, ConfigStore) {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let cfg = ConfigStore::new(kv.clone());
        (kv, cfg)
    }

    #[tokio::test]
    async fn test_load_absent_returns_defaults() {
        let (_, config) = store();
        assert_eq!(config.load().await.unwrap(), ScanConfig::default());
    }

    #[tokio::test]
    async fn test_save_load_roundtrip() {
        let (_, config) = store();
        let cfg = ScanConfig {
            auto_tag: false,
            auto_check: true,
            embedding_ttl_days: 7,
            scope: ScanScope::Cross,
            cross_project_keys: vec!["OPS".to_string(), "WEB".to_string()],
        };
        config.save(&cfg).await.unwrap();

        assert_eq!(config.load().await.unwrap(), cfg);
    }

    #[tokio::test]
    async fn test_load_tolerates_partial_shape() {
        let (kv, config) = store();
        kv.set(CONFIG_KEY, serde_json::json!({"scope": "cross"}))
            .await
            .unwrap();

        let cfg = config.load().await.unwrap();
        assert_eq!(cfg.scope, ScanScope::Cross);
        assert!(cfg.auto_tag);
        assert_eq!(cfg.embedding_ttl_days, 30);
    }

    #[tokio::test]
    async fn test_load_tolerates_garbage() {
        let (kv, config) = store();
        kv.set(CONFIG_KEY, serde_json::json!("not a config"))
            .await
            .unwrap();

        assert_eq!(config.load().await.unwrap(), ScanConfig::default());
    }
}
