//! Canonical data model for the duplicate-detection pipeline.
//!
//! External tracker payloads are normalized into these shapes exactly once at
//! the tracker boundary. Downstream components never alias-chase optional
//! field paths.

use serde::{Deserialize, Serialize};

use crate::defaults;

/// A unit of tracked work, reduced to the fields the pipeline reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    /// Stable tracker key, e.g. "PROJ-42".
    pub key: String,
    /// Short text.
    pub summary: String,
    /// Long text, already flattened to plain text.
    #[serde(default)]
    pub description: String,
    /// Normalized labels.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Owning project key.
    pub project_key: String,
    /// Status category key, lowercased ("new", "indeterminate", "done").
    #[serde(default)]
    pub status_category: String,
}

impl Item {
    /// The text sent to the embedding model for this item.
    pub fn embedding_text(&self) -> String {
        format!("{}\n{}", self.summary, self.description)
    }

    /// True if the item sits in a terminal status category.
    pub fn is_done(&self) -> bool {
        self.status_category.eq_ignore_ascii_case("done")
    }
}

/// A ranked candidate pairing produced by the similarity ranker. Transient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Match {
    /// Candidate item key.
    pub key: String,
    /// Cosine similarity in [0, 1].
    pub score: f32,
}

/// Normalized judge output.
///
/// `confidence` is consistent with the decision path that produced the
/// verdict: auto-accepted matches derive it from the similarity score,
/// judge-confirmed matches surface the judge's own value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Verdict {
    pub is_duplicate: bool,
    /// 0-100.
    pub confidence: u8,
    pub reason: String,
}

impl Verdict {
    /// The safe default returned whenever the judge cannot produce a usable
    /// answer.
    pub fn analysis_failed() -> Self {
        Self {
            is_duplicate: false,
            confidence: 0,
            reason: "AI analysis failed".to_string(),
        }
    }
}

/// A confirmed duplicate, as returned by a scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DuplicateHit {
    /// Candidate item key.
    pub key: String,
    /// Candidate summary, for display.
    pub summary: String,
    /// Cosine similarity in [0, 1].
    pub score: f32,
    /// Verdict confidence, 0-100.
    pub confidence: u8,
    /// One-line explanation of the decision path.
    pub reason: String,
}

/// Persisted alert entry. The alert list for a source item is replaced
/// wholesale on every completed scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertEntry {
    pub key: String,
    pub score: f32,
    pub confidence: u8,
}

impl From<&DuplicateHit> for AlertEntry {
    fn from(hit: &DuplicateHit) -> Self {
        Self {
            key: hit.key.clone(),
            score: hit.score,
            confidence: hit.confidence,
        }
    }
}

/// One source item's scan outcome within a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanGroup {
    pub source: Item,
    /// Sorted descending by confidence.
    pub duplicates: Vec<DuplicateHit>,
}

/// Full batch scan report.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BatchScanReport {
    pub items: Vec<ScanGroup>,
}

/// Candidate search scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScanScope {
    /// Search only the source item's project.
    #[default]
    Current,
    /// Search an explicit set of projects.
    Cross,
}

/// Persisted scan configuration singleton.
///
/// Loaded once per pipeline entry point by the caller and passed down
/// explicitly; nothing reads it mid-pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanConfig {
    /// Run the auto-tagger before scanning on item changes.
    #[serde(default = "default_true")]
    pub auto_tag: bool,
    /// Run the background duplicate check on item changes.
    #[serde(default = "default_true")]
    pub auto_check: bool,
    /// Embedding cache TTL in days. Stored and served, not enforced.
    #[serde(default = "default_ttl")]
    pub embedding_ttl_days: u32,
    #[serde(default)]
    pub scope: ScanScope,
    /// Project keys searched when `scope` is `Cross`.
    #[serde(default)]
    pub cross_project_keys: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            auto_tag: true,
            auto_check: true,
            embedding_ttl_days: defaults::EMBEDDING_TTL_DAYS,
            scope: ScanScope::Current,
            cross_project_keys: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_ttl() -> u32 {
    defaults::EMBEDDING_TTL_DAYS
}

impl ScanConfig {
    /// Resolve the set of project keys candidate search is constrained to.
    ///
    /// Cross scope with an empty selection falls back to the current project
    /// rather than erroring.
    pub fn scope_projects(&self, current_project: &str) -> Vec<String> {
        match self.scope {
            ScanScope::Current => vec![current_project.to_string()],
            ScanScope::Cross => {
                let mut seen = std::collections::HashSet::new();
                let projects: Vec<String> = self
                    .cross_project_keys
                    .iter()
                    .filter(|k| !k.trim().is_empty())
                    .filter(|k| seen.insert(k.trim().to_string()))
                    .map(|k| k.trim().to_string())
                    .collect();
                if projects.is_empty() {
                    tracing::warn!(
                        subsystem = "scanner",
                        "Cross-project scope active but no projects selected, defaulting to current"
                    );
                    vec![current_project.to_string()]
                } else {
                    projects
                }
            }
        }
    }
}
