//! # dupwatch-store
//!
//! PostgreSQL persistence layer for dupwatch.
//!
//! This crate provides:
//! - Connection pool management
//! - A flat key-value store (`kv_entry` table) with an in-memory twin for tests
//! - Typed repositories over the key-value namespace: embedding cache,
//!   alert store, ignore-list store, scan configuration
//!
//! The key namespace is `config`, `embedding:<key>`, `alert:<key>`,
//! `ignore:<key>`. There are no transactions: concurrent scans of the same
//! item key race and the last write wins.

pub mod alerts;
pub mod config;
pub mod embedding_cache;
pub mod ignores;
pub mod kv;
pub mod pool;

// Re-export core types
pub use dupwatch_core::*;

pub use alerts::AlertStore;
pub use config::ConfigStore;
pub use embedding_cache::EmbeddingCache;
pub use ignores::IgnoreStore;
pub use kv::{MemoryKeyValueStore, PgKeyValueStore};
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};

/// Run pending migrations.
#[cfg(feature = "migrations")]
pub async fn migrate(pool: &sqlx::Pool<sqlx::Postgres>) -> Result<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
    Ok(())
}
