//! Candidate discovery: turn a source item into tracker search queries.
//!
//! Strategy, in order: expand the item's labels into a broader search clause
//! through the generation model; failing that, extract keywords from the
//! item's text the same way; failing that, fall back to a deterministic
//! token split of the summary. A source with no usable keywords yields no
//! queries rather than an error.

use regex::Regex;
use serde_json::json;
use tracing::{debug, warn};

use dupwatch_core::{defaults, GenerationBackend, Item};
use dupwatch_inference::jsonx;

/// Text budget for the keyword-extraction prompt (characters).
const PROMPT_TEXT_CHARS: usize = 400;

/// Build the search clauses for one source item.
///
/// Returns zero or more clauses to be unioned by the caller; each still
/// needs [`candidate_query`] to apply scope and exclusion constraints.
pub async fn discover_clauses(item: &Item, generator: &dyn GenerationBackend) -> Vec<String> {
    let mut clauses = Vec::new();

    if !item.labels.is_empty() {
        clauses.push(label_clause(&item.labels));
        match expand_labels(&item.labels, generator).await {
            Some(expanded) => clauses.push(expanded),
            // Expansion failed: fall through to the text-keyword path.
            None => {
                if let Some(clause) =
                    keyword_clause(&item.summary, &item.description, generator).await
                {
                    clauses.push(clause);
                }
            }
        }
    } else if let Some(clause) = keyword_clause(&item.summary, &item.description, generator).await {
        clauses.push(clause);
    }

    debug!(
        subsystem = "scanner",
        component = "discovery",
        item_key = %item.key,
        clause_count = clauses.len(),
        "Candidate discovery complete"
    );
    clauses
}

/// Direct label search clause: `labels in ("a","b")`.
pub fn label_clause(labels: &[String]) -> String {
    let quoted: Vec<String> = labels.iter().map(|l| format!("\"{l}\"")).collect();
    format!("labels in ({})", quoted.join(","))
}

/// Ask the generation model to expand labels with synonyms into a text
/// search clause. Failures degrade to `None`.
async fn expand_labels(labels: &[String], generator: &dyn GenerationBackend) -> Option<String> {
    let prompt = format!(
        "Return ONLY valid JSON. No markdown, no code fences, no extra text.\n\
         Task: Create a text search clause for these tags. Expand them with 1-2 synonyms each.\n\
         Input Tags JSON: {}\n\
         Output JSON schema: {{ \"query\": \"text ~ \\\"t1\\\" OR text ~ \\\"t2\\\" OR text ~ \\\"t3\\\"\" }}",
        json!(labels)
    );

    match generator.generate_json(&prompt).await {
        Ok(raw) => parse_query_field(&raw),
        Err(e) => {
            warn!(
                subsystem = "scanner",
                component = "discovery",
                error = %e,
                "Label expansion failed"
            );
            None
        }
    }
}

/// Ask the generation model for keywords from the item text, falling back to
/// the deterministic summary split when the assisted step fails.
async fn keyword_clause(
    summary: &str,
    description: &str,
    generator: &dyn GenerationBackend,
) -> Option<String> {
    let clean_summary = strip_bracketed(summary);
    let text: String = format!("{clean_summary}\n{description}")
        .chars()
        .take(PROMPT_TEXT_CHARS)
        .collect();

    let prompt = format!(
        "You are a JSON generator. Output valid JSON only.\n\
         Task: Extract 3 technical keywords from the text below and return a text search clause.\n\
         Output Format: {{ \"query\": \"text ~ \\\"keyword1\\\" OR text ~ \\\"keyword2\\\"\" }}\n\
         Input Text: \"{text}\"\n\
         JSON:"
    );

    match generator.generate_json(&prompt).await {
        Ok(raw) => {
            if let Some(clause) = parse_query_field(&raw) {
                return Some(clause);
            }
            warn!(
                subsystem = "scanner",
                component = "discovery",
                "Keyword extraction returned unusable JSON, using fallback"
            );
        }
        Err(e) => {
            warn!(
                subsystem = "scanner",
                component = "discovery",
                error = %e,
                "Keyword extraction failed, using fallback"
            );
        }
    }

    fallback_clause(&clean_summary)
}

/// Pull the query clause out of a model payload, tolerating the `jql`
/// field name some models insist on.
fn parse_query_field(raw: &str) -> Option<String> {
    let value = jsonx::extract(raw)?;
    let clause = value
        .get("query")
        .or_else(|| value.get("jql"))
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())?;
    Some(clause.to_string())
}

/// Deterministic extraction: split the summary into words, keep tokens
/// longer than [`defaults::KEYWORD_MIN_CHARS`] characters, take up to
/// [`defaults::KEYWORD_LIMIT`], and build a plain OR-query.
pub fn fallback_clause(summary: &str) -> Option<String> {
    let keywords: Vec<&str> = summary
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > defaults::KEYWORD_MIN_CHARS)
        .take(defaults::KEYWORD_LIMIT)
        .collect();

    if keywords.is_empty() {
        return None;
    }
    let terms: Vec<String> = keywords
        .iter()
        .map(|k| format!("text ~ \"{k}\""))
        .collect();
    Some(format!("({})", terms.join(" OR ")))
}

/// Remove `[...]` tag prefixes that would pollute keyword extraction.
fn strip_bracketed(summary: &str) -> String {
    Regex::new(r"\[.*?\]")
        .expect("static pattern")
        .replace_all(summary, "")
        .trim()
        .to_string()
}

/// Project scope clause for the resolved project set.
pub fn scope_clause(projects: &[String]) -> String {
    if projects.len() == 1 {
        format!("project = \"{}\"", projects[0])
    } else {
        let quoted: Vec<String> = projects.iter().map(|p| format!("\"{p}\"")).collect();
        format!("project in ({})", quoted.join(","))
    }
}

/// Final candidate query: scope, discovery clause, terminal-status and
/// self-key exclusion.
pub fn candidate_query(scope: &str, clause: &str, source_key: &str) -> String {
    format!("{scope} AND ({clause}) AND statusCategory != Done AND key != {source_key}")
}
