//! Bounded batch scan over a project backlog.
//!
//! One invocation processes at most [`defaults::BATCH_ITEM_CAP`] source
//! items so latency and provider cost stay predictable; callers page through
//! the backlog with increasing offsets. Items are processed sequentially to
//! bound concurrent outbound calls against both the tracker and the AI
//! provider.

use std::time::Instant;

use tracing::{info, warn};

use dupwatch_core::{defaults, BatchScanReport, Error, Result, ScanConfig, ScanGroup};

use crate::pipeline::ScanEngine;

/// Scan a slice of the backlog of `project_key`.
///
/// A single item's pipeline failure is logged and skipped; the batch
/// continues. Output groups carry only sources with at least one confirmed
/// duplicate, each list sorted descending by confidence.
pub async fn scan_backlog_batch(
    engine: &ScanEngine,
    offset: usize,
    limit: usize,
    project_key: &str,
    config: &ScanConfig,
) -> Result<BatchScanReport> {
    if project_key.trim().is_empty() {
        return Err(Error::Config("a project key is required for scanning".into()));
    }

    let start = Instant::now();
    let effective_limit = limit.min(defaults::BATCH_ITEM_CAP);

    info!(
        subsystem = "scanner",
        component = "batch",
        project_key = %project_key,
        offset,
        limit = effective_limit,
        "Starting backlog batch scan"
    );

    // Sources always come from the current project, newest first. The
    // candidate scope may still span other projects via config.
    let source_query = format!(
        "project = \"{project_key}\" AND statusCategory != Done ORDER BY created DESC"
    );
    let sources = engine
        .search()
        .search(&source_query, defaults::SOURCE_FETCH_LIMIT)
        .await?;

    let window: Vec<_> = sources
        .into_iter()
        .skip(offset)
        .take(effective_limit)
        .collect();

    let mut report = BatchScanReport::default();
    for source in window {
        match engine
            .scan_item(&source, config, defaults::BATCH_CANDIDATE_LIMIT)
            .await
        {
            Ok(duplicates) if !duplicates.is_empty() => {
                report.items.push(ScanGroup { source, duplicates });
            }
            Ok(_) => {}
            Err(e) => {
                warn!(
                    subsystem = "scanner",
                    component = "batch",
                    item_key = %source.key,
                    error = %e,
                    "Item scan failed, continuing batch"
                );
            }
        }
    }

    info!(
        subsystem = "scanner",
        component = "batch",
        project_key = %project_key,
        result_count = report.items.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Backlog batch scan complete"
    );
    Ok(report)
}
