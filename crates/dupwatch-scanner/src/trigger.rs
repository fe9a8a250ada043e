//! Event-driven incremental scan: one item, triggered by a content change.

use tracing::{info, warn};

use dupwatch_core::{defaults, Result, ScanConfig};
use dupwatch_tracker::{ChangeEvent, TrackerClient, DEMO_ITEM_PROPERTY};

use crate::pipeline::ScanEngine;
use crate::tagger;

/// Handle an item-changed event.
///
/// Guards, in order, each a short-circuit "do nothing": synthetic/demo
/// items, non-content edits, then the config gates (auto-tag runs before the
/// auto-check gate so tagging still happens when background scanning is
/// off). On confirmed alerts a short notification comment is posted; on a
/// clean scan the pipeline has already cleared any stored alert.
pub async fn handle_item_changed(
    event: ChangeEvent,
    engine: &ScanEngine,
    tracker: &TrackerClient,
    config: &ScanConfig,
) -> Result<()> {
    let item_key = event.item.key.clone();

    // 1) Never scan synthetic/demo data. Lookup failures count as "not demo".
    let is_demo = tracker
        .has_property(&item_key, DEMO_ITEM_PROPERTY)
        .await
        .unwrap_or(false);
    if is_demo {
        info!(
            subsystem = "scanner",
            component = "trigger",
            item_key = %item_key,
            "Ignoring demo item"
        );
        return Ok(());
    }

    // 2) Skip edits that did not touch summary or description.
    if !event.content_changed() {
        info!(
            subsystem = "scanner",
            component = "trigger",
            item_key = %item_key,
            changed_fields = ?event.changed_fields(),
            "No content change, skipping"
        );
        return Ok(());
    }

    let mut item = event.item.normalize();
    info!(
        subsystem = "scanner",
        component = "trigger",
        item_key = %item.key,
        project_key = %item.project_key,
        "Content change triggered scan"
    );

    // 3) Auto-tagging. Extracted tags feed candidate discovery below.
    if config.auto_tag {
        match tagger::ensure_tags(&item, engine.generator().as_ref(), tracker).await {
            Ok(tags) if !tags.is_empty() => item.labels = tags,
            Ok(_) => {}
            Err(e) => {
                warn!(
                    subsystem = "scanner",
                    component = "trigger",
                    item_key = %item.key,
                    error = %e,
                    "Auto-tagging failed"
                );
            }
        }
    }

    // 4) Background duplicate checking can be disabled independently.
    if !config.auto_check {
        info!(
            subsystem = "scanner",
            component = "trigger",
            item_key = %item.key,
            "Background duplicate check disabled, stopping after tagging"
        );
        return Ok(());
    }

    let hits = engine
        .scan_item(&item, config, defaults::BATCH_CANDIDATE_LIMIT)
        .await?;

    if !hits.is_empty() {
        let text = format!(
            "Detected {} potential duplicate(s). Open the duplicate panel to review.",
            hits.len()
        );
        if let Err(e) = tracker.add_comment(&item.key, &text).await {
            warn!(
                subsystem = "scanner",
                component = "trigger",
                item_key = %item.key,
                error = %e,
                "Failed to post alert comment"
            );
        }
    }

    Ok(())
}
