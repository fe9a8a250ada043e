//! Core traits for dupwatch abstractions.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::models::Item;

/// Backend capable of producing embedding vectors.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Embed a batch of texts, one vector per input, in order.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// The vector dimension this backend produces.
    fn dimension(&self) -> usize;

    /// The embedding model name.
    fn model_name(&self) -> &str;
}

/// Backend capable of free-form text generation.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate a completion for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with JSON output enforcement where the backend supports it.
    ///
    /// The returned string is still untrusted: models wrap payloads in prose
    /// and code fences, so callers coerce it through `jsonx` regardless.
    async fn generate_json(&self, prompt: &str) -> Result<String>;

    /// The generation model name.
    fn model_name(&self) -> &str;
}

/// Search over the tracker's item corpus.
///
/// The query expression uses the tracker's filter syntax (project and status
/// clauses included); implementations only execute it.
#[async_trait]
pub trait ItemSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<Item>>;
}

/// Untyped key-value persistence: plain get/set/delete, no transactions,
/// no listing. Concurrent writers to the same key race (last write wins).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>>;

    async fn set(&self, key: &str, value: JsonValue) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;
}
