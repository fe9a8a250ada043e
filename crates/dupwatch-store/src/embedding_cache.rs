//! Embedding cache: item key → vector, generated lazily on first need.
//!
//! A cached vector is returned unchanged no matter how old the item's text
//! now is. Regeneration requires explicit key deletion; the configured TTL is
//! stored but not enforced here.

use std::sync::Arc;
use std::time::Instant;

use serde_json::json;
use tracing::{debug, warn};

use dupwatch_core::{EmbeddingBackend, Error, KeyValueStore, Result};

/// Storage key for an item's cached embedding.
pub fn embedding_key(item_key: &str) -> String {
    format!("embedding:{item_key}")
}

/// Lazily-populated embedding cache over the key-value store.
#[derive(Clone)]
pub struct EmbeddingCache {
    store: Arc<dyn KeyValueStore>,
    backend: Arc<dyn EmbeddingBackend>,
}

impl EmbeddingCache {
    pub fn new(store: Arc<dyn KeyValueStore>, backend: Arc<dyn EmbeddingBackend>) -> Self {
        Self { store, backend }
    }

    /// Return the cached vector for `item_key`, or embed `text`, persist the
    /// result and return it.
    ///
    /// A failed persistence write is logged and swallowed: the computed
    /// vector is still returned for the current scan. A provider failure or
    /// a non-vector cache shape is an error.
    pub async fn get_or_create(&self, item_key: &str, text: &str) -> Result<Vec<f32>> {
        if item_key.trim().is_empty() {
            return Err(Error::InvalidInput("item key must not be empty".into()));
        }
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("embedding text must not be empty".into()));
        }

        let key = embedding_key(item_key);
        if let Some(value) = self.store.get(&key).await? {
            if let Some(vector) = decode_vector(&value) {
                debug!(
                    subsystem = "store",
                    component = "embedding_cache",
                    item_key = %item_key,
                    dimension = vector.len(),
                    "Embedding cache hit"
                );
                return Ok(vector);
            }
            warn!(
                subsystem = "store",
                component = "embedding_cache",
                item_key = %item_key,
                "Cached embedding has invalid shape, regenerating"
            );
        }

        let start = Instant::now();
        let mut vectors = self.backend.embed_texts(&[text.to_string()]).await?;
        let vector = vectors
            .pop()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::Embedding("provider returned no vector".into()))?;

        if let Err(e) = self.store.set(&key, json!(vector)).await {
            warn!(
                subsystem = "store",
                component = "embedding_cache",
                item_key = %item_key,
                error = %e,
                "Failed to persist embedding, returning uncached vector"
            );
        }

        debug!(
            subsystem = "store",
            component = "embedding_cache",
            item_key = %item_key,
            dimension = vector.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Embedding generated"
        );
        Ok(vector)
    }

    /// Evict a cached embedding. The next `get_or_create` re-embeds.
    pub async fn evict(&self, item_key: &str) -> Result<()> {
        self.store.delete(&embedding_key(item_key)).await
    }
}

/// Decode a stored JSON value into a vector, rejecting non-numeric shapes.
fn decode_vector(value: &serde_json::Value) -> Option<Vec<f32>> {
    let array = value.as_array()?;
    if array.is_empty() {
        return None;
    }
    array
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32))
        .collect::<Option<Vec<f32>>>()
}
