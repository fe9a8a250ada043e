//! # dupwatch-inference
//!
//! Inference provider layer for dupwatch.
//!
//! This crate provides:
//! - The Ollama backend implementing both embedding and generation
//! - The duplicate judge (prompt construction + verdict normalization)
//! - `jsonx`, the isolated coercion of chatty model output into JSON

pub mod jsonx;
pub mod judge;
pub mod ollama;

// Re-export core types
pub use dupwatch_core::*;

pub use judge::{normalize_verdict, DuplicateJudge};
pub use ollama::OllamaBackend;
