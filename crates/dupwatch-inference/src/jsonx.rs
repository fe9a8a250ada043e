//! Coercion of chatty model output into JSON.
//!
//! Generation models wrap payloads in prose, code fences, or both, and
//! sometimes return garbage. The contract here is strict: `extract` returns
//! the parsed value or `None`, never an error. These heuristics are
//! load-bearing for the judge and candidate discovery, so they live in one
//! place and are tested independently of any network call.

use serde_json::Value;

/// Coerce raw model output into a JSON value.
///
/// Strategy, in order:
/// 1. parse the trimmed input directly,
/// 2. strip code fences and leading conversational fluff, parse again,
/// 3. parse the largest balanced `{...}` substring,
/// 4. give up (`None`).
pub fn extract(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    let cleaned = strip_code_fences(trimmed);
    if let Ok(value) = serde_json::from_str(cleaned.trim()) {
        return Some(value);
    }

    largest_balanced_object(&cleaned).and_then(|s| serde_json::from_str(s).ok())
}

/// Remove markdown code fences (```json ... ```) around the payload.
fn strip_code_fences(text: &str) -> String {
    let mut t = text.trim();

    if let Some(rest) = t.strip_prefix("```") {
        // Drop an optional language identifier after the opening fence.
        t = match rest.find('\n') {
            Some(idx) => &rest[idx + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }
    if let Some(rest) = t.strip_suffix("```") {
        t = rest;
    }
    t.trim().to_string()
}

/// Find the largest balanced `{...}` substring by brace depth counting.
///
/// Braces inside string literals are not special-cased; the earlier direct
/// parse catches well-formed payloads, this is the salvage path.
fn largest_balanced_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut best: Option<&str> = None;

    for (i, &b) in bytes.iter().enumerate() {
        if b != b'{' {
            continue;
        }
        let mut depth = 0usize;
        for (j, &c) in bytes.iter().enumerate().skip(i) {
            match c {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        let candidate = &text[i..=j];
                        if best.map_or(true, |b| candidate.len() > b.len()) {
                            best = Some(candidate);
                        }
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    best
}
