//! Auto-tagger: derive labels for unlabeled items and write them back.
//!
//! Extracted tags feed candidate discovery, so an item edited into existence
//! without labels still gets a label-quality search.

use serde_json::Value;
use tracing::{info, warn};

use dupwatch_core::{defaults, GenerationBackend, Item, Result};
use dupwatch_inference::jsonx;
use dupwatch_tracker::TrackerClient;

/// Ensure `item` has labels.
///
/// Existing labels are returned as-is. Otherwise the generation model
/// proposes 3-5 keyword tags, which are normalized and written back to the
/// tracker (write-back failure is logged and swallowed; the tags are still
/// returned for this scan).
pub async fn ensure_tags(
    item: &Item,
    generator: &dyn GenerationBackend,
    tracker: &TrackerClient,
) -> Result<Vec<String>> {
    if !item.labels.is_empty() {
        return Ok(item.labels.clone());
    }

    let text = format!("{}\n\n{}", item.summary, item.description);
    let prompt = format!(
        "Extract 3-5 technical keywords/tags from this text. \
         Return a JSON array of strings only.\n\n{}",
        text.trim()
    );

    let raw = generator.generate_json(&prompt).await?;
    let tags = jsonx::extract(&raw)
        .map(|value| normalize_tags(&value))
        .unwrap_or_default();

    if tags.is_empty() {
        warn!(
            subsystem = "scanner",
            component = "tagger",
            item_key = %item.key,
            "Tag extraction produced no usable tags"
        );
        return Ok(tags);
    }

    info!(
        subsystem = "scanner",
        component = "tagger",
        item_key = %item.key,
        result_count = tags.len(),
        "Applying extracted tags"
    );
    if let Err(e) = tracker.update_labels(&item.key, &tags).await {
        warn!(
            subsystem = "scanner",
            component = "tagger",
            item_key = %item.key,
            error = %e,
            "Failed to write labels back to tracker"
        );
    }

    Ok(tags)
}

/// Normalize a raw tag payload into clean, unique, bounded labels.
///
/// Accepts a JSON array, an object with a `tags` array, or a string (JSON
/// array or comma-separated). Each tag is lowercased and reduced to
/// `[a-z0-9-]`; duplicates drop, at most [`defaults::MAX_TAGS`] survive.
pub fn normalize_tags(raw: &Value) -> Vec<String> {
    let candidates: Vec<String> = match raw {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Value::Object(map) => map
            .get("tags")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default(),
        Value::String(s) => match serde_json::from_str::<Vec<String>>(s) {
            Ok(parsed) => parsed,
            Err(_) => s.split(',').map(str::to_string).collect(),
        },
        _ => Vec::new(),
    };

    let mut seen = std::collections::HashSet::new();
    let mut tags = Vec::new();
    for candidate in candidates {
        let tag = slugify(&candidate);
        if !tag.is_empty() && seen.insert(tag.clone()) {
            tags.push(tag);
        }
        if tags.len() == defaults::MAX_TAGS {
            break;
        }
    }
    tags
}

/// Lowercase and collapse every non-alphanumeric run to a single dash.
fn slugify(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    let mut pending_dash = false;
    for c in tag.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }
    out
}
