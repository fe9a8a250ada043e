//! Normalization of raw tracker payloads into the canonical [`Item`].
//!
//! This is the single place where external item shapes are interpreted.
//! Downstream pipeline code only ever sees `Item`.

use serde::Deserialize;
use serde_json::Value;

use dupwatch_core::Item;

/// Raw item envelope as returned by the tracker REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    pub key: String,
    #[serde(default)]
    pub fields: RawFields,
}

/// Raw field block. Every field is optional; normalization fills defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFields {
    #[serde(default)]
    pub summary: Option<String>,
    /// Plain string or a rich-text document node.
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub project: Option<RawProject>,
    #[serde(default)]
    pub status: Option<RawStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawProject {
    pub key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawStatus {
    #[serde(rename = "statusCategory", default)]
    pub status_category: Option<RawStatusCategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawStatusCategory {
    pub key: String,
}

impl RawItem {
    /// Map the raw envelope into the canonical item shape.
    pub fn normalize(self) -> Item {
        let fields = self.fields;
        Item {
            key: self.key,
            summary: fields.summary.unwrap_or_default(),
            description: fields
                .description
                .as_ref()
                .map(flatten_description)
                .unwrap_or_default(),
            labels: fields.labels.unwrap_or_default(),
            project_key: fields.project.map(|p| p.key).unwrap_or_default(),
            status_category: fields
                .status
                .and_then(|s| s.status_category)
                .map(|c| c.key.to_lowercase())
                .unwrap_or_default(),
        }
    }
}

/// Reduce a description value to plain text.
///
/// Plain strings pass through. Rich-text documents are flattened by
/// collecting every `text` node in document order.
pub fn flatten_description(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) => {
            let mut parts = Vec::new();
            collect_text_nodes(value, &mut parts);
            parts.join(" ")
        }
        _ => String::new(),
    }
}

fn collect_text_nodes(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(text)) = map.get("text") {
                if !text.trim().is_empty() {
                    out.push(text.trim().to_string());
                }
            }
            if let Some(content) = map.get("content") {
                collect_text_nodes(content, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_text_nodes(item, out);
            }
        }
        _ => {}
    }
}

/// Item-changed event delivered to the incremental scanner.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeEvent {
    pub item: RawItem,
    #[serde(default)]
    pub changelog: Option<Changelog>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Changelog {
    #[serde(default)]
    pub items: Vec<ChangelogEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangelogEntry {
    pub field: String,
}

impl ChangeEvent {
    /// True if the triggering change touched summary or description.
    ///
    /// Events without a changelog (e.g. creations) count as content changes.
    pub fn content_changed(&self) -> bool {
        match &self.changelog {
            None => true,
            Some(log) => log
                .items
                .iter()
                .any(|e| e.field == "summary" || e.field == "description"),
        }
    }

    /// Fields named by the changelog, for logging.
    pub fn changed_fields(&self) -> Vec<&str> {
        self.changelog
            .as_ref()
            .map(|log| log.items.iter().map(|e| e.field.as_str()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(payload: Value) -> RawItem {
        serde_json::from_value(payload).unwrap()
    }

    #[test]
    fn test_normalize_full_item() {
        let item = raw(json!({
            "key": "APP-1",
            "fields": {
                "summary": "Login crash",
                "description": "The page crashes",
                "labels": ["auth", "login"],
                "project": {"key": "APP"},
                "status": {"statusCategory": {"key": "New"}}
            }
        }))
        .normalize();

        assert_eq!(item.key, "APP-1");
        assert_eq!(item.summary, "Login crash");
        assert_eq!(item.description, "The page crashes");
        assert_eq!(item.labels, vec!["auth", "login"]);
        assert_eq!(item.project_key, "APP");
        assert_eq!(item.status_category, "new");
    }

    #[test]
    fn test_normalize_missing_fields_take_defaults() {
        let item = raw(json!({"key": "APP-2"})).normalize();

        assert_eq!(item.key, "APP-2");
        assert_eq!(item.summary, "");
        assert_eq!(item.description, "");
        assert!(item.labels.is_empty());
        assert_eq!(item.project_key, "");
        assert_eq!(item.status_category, "");
    }

    #[test]
    fn test_normalize_rich_description_flattened() {
        let item = raw(json!({
            "key": "APP-3",
            "fields": {
                "summary": "s",
                "description": {
                    "type": "doc",
                    "version": 1,
                    "content": [
                        {"type": "paragraph", "content": [
                            {"type": "text", "text": "First line."},
                            {"type": "text", "text": "Second part."}
                        ]},
                        {"type": "paragraph", "content": [
                            {"type": "text", "text": "Another paragraph."}
                        ]}
                    ]
                }
            }
        }))
        .normalize();

        assert_eq!(item.description, "First line. Second part. Another paragraph.");
    }

    #[test]
    fn test_flatten_description_non_text_value() {
        assert_eq!(flatten_description(&json!(42)), "");
        assert_eq!(flatten_description(&json!({"type": "doc"})), "");
    }

    #[test]
    fn test_content_changed_without_changelog() {
        let event: ChangeEvent =
            serde_json::from_value(json!({"item": {"key": "APP-1"}})).unwrap();
        assert!(event.content_changed());
    }

    #[test]
    fn test_content_changed_detects_summary_edit() {
        let event: ChangeEvent = serde_json::from_value(json!({
            "item": {"key": "APP-1"},
            "changelog": {"items": [{"field": "summary"}]}
        }))
        .unwrap();
        assert!(event.content_changed());
    }

    #[test]
    fn test_content_changed_false_for_unrelated_fields() {
        let event: ChangeEvent = serde_json::from_value(json!({
            "item": {"key": "APP-1"},
            "changelog": {"items": [{"field": "assignee"}, {"field": "priority"}]}
        }))
        .unwrap();
        assert!(!event.content_changed());
        assert_eq!(event.changed_fields(), vec!["assignee", "priority"]);
    }
}
