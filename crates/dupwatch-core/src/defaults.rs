//! Default values for tunable dupwatch parameters.
//!
//! Every constant here can be overridden through the environment variable
//! named next to it. The pipeline thresholds are deliberate policy values:
//! raising `AUTO_ACCEPT_THRESHOLD` sends more matches to the (costly) judge,
//! lowering `SIMILARITY_THRESHOLD` widens the candidate band.

/// Default Ollama endpoint. Override: `DUPWATCH_OLLAMA_URL`.
pub const OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default embedding model. Override: `DUPWATCH_EMBED_MODEL`.
pub const EMBED_MODEL: &str = "nomic-embed-text";

/// Default generation model. Override: `DUPWATCH_GEN_MODEL`.
pub const GEN_MODEL: &str = "llama3.1:8b";

/// Default embedding dimension for nomic-embed-text. Override: `DUPWATCH_EMBED_DIM`.
pub const EMBED_DIMENSION: usize = 768;

/// Timeout for embedding requests (seconds). Override: `DUPWATCH_EMBED_TIMEOUT_SECS`.
pub const EMBED_TIMEOUT_SECS: u64 = 30;

/// Timeout for generation requests (seconds). Override: `DUPWATCH_GEN_TIMEOUT_SECS`.
pub const GEN_TIMEOUT_SECS: u64 = 120;

/// Timeout for tracker REST requests (seconds). Override: `DUPWATCH_TRACKER_TIMEOUT_SECS`.
pub const TRACKER_TIMEOUT_SECS: u64 = 30;

/// Minimum similarity for a candidate to reach verdict tiering.
/// Scores at or below this are discarded by the ranker.
pub const SIMILARITY_THRESHOLD: f32 = 0.4;

/// Similarity above which a match is accepted without consulting the judge.
pub const AUTO_ACCEPT_THRESHOLD: f32 = 0.85;

/// Similarity above which a transport-level judge failure still confirms
/// the match (vector-only fallback).
pub const JUDGE_FALLBACK_THRESHOLD: f32 = 0.7;

/// Hard cap on persisted alert entries per source item.
pub const MAX_ALERT_ENTRIES: usize = 3;

/// Hard cap on backlog items processed per batch invocation.
pub const BATCH_ITEM_CAP: usize = 5;

/// Candidates embedded per source item in the batch path.
pub const BATCH_CANDIDATE_LIMIT: usize = 5;

/// Candidates embedded per source item in the single-item path.
pub const SINGLE_CANDIDATE_LIMIT: usize = 10;

/// Maximum results requested per tracker search query.
pub const SEARCH_MAX_RESULTS: u32 = 15;

/// Maximum source items fetched per batch scan before offset slicing.
pub const SOURCE_FETCH_LIMIT: u32 = 50;

/// Summary length sent to the judge (characters).
pub const JUDGE_SUMMARY_CHARS: usize = 300;

/// Description length sent to the judge (characters).
pub const JUDGE_DESCRIPTION_CHARS: usize = 500;

/// Keyword tokens shorter than or equal to this are dropped by the
/// deterministic discovery fallback.
pub const KEYWORD_MIN_CHARS: usize = 3;

/// Maximum keywords used by the deterministic discovery fallback.
pub const KEYWORD_LIMIT: usize = 3;

/// Maximum labels produced by the auto-tagger.
pub const MAX_TAGS: usize = 5;

/// Default embedding cache TTL in days (stored in config, not enforced).
pub const EMBEDDING_TTL_DAYS: u32 = 30;
