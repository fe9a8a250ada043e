//! # dupwatch-scanner
//!
//! The duplicate scan engine for dupwatch.
//!
//! This crate provides:
//! - Similarity ranking (cosine scores, threshold filtering)
//! - Candidate discovery (label expansion, keyword extraction, fallback)
//! - Verdict tiering (auto-accept / judge / reject bands)
//! - The shared per-item pipeline and its two orchestration modes:
//!   bounded batch iteration and the event-driven single-item trigger
//! - The auto-tagger feeding discovery on unlabeled items

pub mod batch;
pub mod discovery;
pub mod pipeline;
pub mod rank;
pub mod tagger;
pub mod tiering;
pub mod trigger;

// Re-export core types
pub use dupwatch_core::*;

pub use batch::scan_backlog_batch;
pub use pipeline::ScanEngine;
pub use rank::{cosine_similarity, find_top_matches, Candidate};
pub use trigger::handle_item_changed;
