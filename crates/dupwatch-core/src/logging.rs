//! Structured logging schema for dupwatch.
//!
//! All crates use these field names for consistent structured logging so log
//! aggregation tools can query by the same keys across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, scan completions |
//! | DEBUG | Decision points, intermediate values |
//! | TRACE | Per-candidate iteration, high-volume data |

/// Subsystem originating the log event.
/// Values: "api", "scanner", "store", "inference", "tracker"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "ollama", "judge", "pipeline", "batch", "trigger", "kv"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "scan_item", "embed_texts", "generate", "record_alerts"
pub const OPERATION: &str = "op";

/// Work-item key being operated on.
pub const ITEM_KEY: &str = "item_key";

/// Project key scoping a scan.
pub const PROJECT_KEY: &str = "project_key";

/// Cosine similarity score for a candidate pair.
pub const SCORE: &str = "score";

/// Verdict confidence (0-100).
pub const CONFIDENCE: &str = "confidence";

/// Number of candidates discovered before ranking.
pub const CANDIDATE_COUNT: &str = "candidate_count";

/// Number of matches surviving the similarity threshold.
pub const MATCH_COUNT: &str = "match_count";

/// Number of results returned by a search or scan.
pub const RESULT_COUNT: &str = "result_count";

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Model name used for inference.
pub const MODEL: &str = "model";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Slow operation threshold exceeded.
pub const SLOW: &str = "slow";
