//! The duplicate judge: asks a generation model whether two work items
//! describe the same underlying intent.
//!
//! The judge degrades rather than escalates. Unparsable or shape-invalid
//! model output normalizes to the safe default verdict; only a failure of
//! the generation call itself surfaces as an error, so the tiering layer can
//! apply its vector-score fallback.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use dupwatch_core::{defaults, GenerationBackend, Item, Result, Verdict};

use crate::jsonx;

/// Generation-model-backed duplicate classifier.
#[derive(Clone)]
pub struct DuplicateJudge {
    backend: Arc<dyn GenerationBackend>,
}

impl DuplicateJudge {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    /// Classify whether `candidate` duplicates `source`.
    ///
    /// Returns `Err` only when the generation call itself fails. Any output
    /// the model does produce, however malformed, becomes a well-formed
    /// verdict (confidence 0 on total failure).
    pub async fn judge(&self, source: &Item, candidate: &Item) -> Result<Verdict> {
        let prompt = build_prompt(source, candidate);
        let raw = self.backend.generate_json(&prompt).await?;

        match jsonx::extract(&raw) {
            Some(value) => {
                let verdict = normalize_verdict(&value);
                debug!(
                    subsystem = "inference",
                    component = "judge",
                    item_key = %source.key,
                    target = %candidate.key,
                    is_duplicate = verdict.is_duplicate,
                    confidence = verdict.confidence,
                    "Judge verdict"
                );
                Ok(verdict)
            }
            None => {
                warn!(
                    subsystem = "inference",
                    component = "judge",
                    item_key = %source.key,
                    target = %candidate.key,
                    response_len = raw.len(),
                    "Judge output could not be parsed"
                );
                Ok(Verdict::analysis_failed())
            }
        }
    }
}

/// Build the fixed comparison prompt from truncated item texts.
///
/// Truncation bounds the token budget; it is not a correctness concern.
fn build_prompt(source: &Item, candidate: &Item) -> String {
    let a_summary = truncate_chars(&source.summary, defaults::JUDGE_SUMMARY_CHARS);
    let a_desc = truncate_chars(&source.description, defaults::JUDGE_DESCRIPTION_CHARS);
    let b_summary = truncate_chars(&candidate.summary, defaults::JUDGE_SUMMARY_CHARS);
    let b_desc = truncate_chars(&candidate.description, defaults::JUDGE_DESCRIPTION_CHARS);

    format!(
        r#"### Context
You are a tracker administrator cleaning up a project backlog.
Item A and Item B are tracked work items.

### Task
Determine if these two items describe the same core intent, such that keeping both open would be redundant.

### Criteria for "isDuplicate: true"
1. Strict duplicate: they describe the exact same bug or feature.
2. Scope overlap: one is a general request and the other is a specific implementation of it. Treat these as duplicates.
3. Different phrasing: one uses technical terms, the other uses user terms, but they refer to the same issue.

### Criteria for "isDuplicate: false"
1. They describe completely different features.
2. They are two separate bugs on the same component.

### Output Format
Return a JSON object with these exact fields. Do not add markdown.
{{
  "isDuplicate": boolean,
  "confidence": number (0-100),
  "reason": "A short, one-sentence explanation of why."
}}

### Item A
Summary: {a_summary}
Description: {a_desc}

### Item B
Summary: {b_summary}
Description: {b_desc}

### Output
JSON:"#
    )
}

/// Normalize a parsed judge payload into a [`Verdict`].
///
/// Accepts `isDuplicate`, `isRedundant`, or `match` as the boolean signal
/// (first present wins); confidence defaults to 0 and is clamped to 0-100;
/// a missing reason gets a placeholder.
pub fn normalize_verdict(value: &Value) -> Verdict {
    let Some(object) = value.as_object() else {
        return Verdict::analysis_failed();
    };

    let is_duplicate = ["isDuplicate", "isRedundant", "match"]
        .iter()
        .find_map(|field| object.get(*field).filter(|v| !v.is_null()))
        .map(truthy)
        .unwrap_or(false);

    let confidence = object
        .get("confidence")
        .and_then(|v| {
            v.as_f64()
                .or_else(|| v.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
        })
        .map(|c| c.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(0);

    let reason = object
        .get("reason")
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("AI detected similarity but provided no specific reason")
        .to_string();

    Verdict {
        is_duplicate,
        confidence,
        reason,
    }
}

/// Loose truthiness for the duplicate signal, matching how models actually
/// answer (true/"true"/1 all mean yes).
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty() && !s.eq_ignore_ascii_case("false"),
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Truncate to at most `max` characters on a char boundary.
fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
