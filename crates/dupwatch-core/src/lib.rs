//! # dupwatch-core
//!
//! Core types, traits, and abstractions for dupwatch.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other dupwatch crates depend on: the error taxonomy, the canonical
//! work-item model, the provider traits for embeddings, generation, tracker
//! search and key-value persistence, and the tunable pipeline defaults.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
