//! # dupwatch-tracker
//!
//! Issue-tracker integration for dupwatch.
//!
//! This crate provides:
//! - A reqwest REST client for the tracker (search, item fetch, label
//!   updates, comments, entity properties)
//! - The boundary normalization that maps raw tracker payloads into the
//!   canonical [`dupwatch_core::Item`]

pub mod client;
pub mod item;

// Re-export core types
pub use dupwatch_core::*;

pub use client::{TrackerClient, ALERT_COMMENT_PROPERTY, DEMO_ITEM_PROPERTY};
pub use item::{flatten_description, ChangeEvent, Changelog, ChangelogEntry, RawItem};
