//! Recovery of a JSON object from free-form model output.
//!
//! Models wrap answers in reasoning blocks, markdown fences or prose. The
//! extraction tries, in order: a ```json fenced object, the outermost `{...}`
//! span, then the whole cleaned text. Only JSON objects count as parsed.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

lazy_static! {
    static ref THINK_BLOCK: Regex = Regex::new(r"(?s)<think>.*?</think>").unwrap();
    static ref JSON_FENCE: Regex = Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Parsed(Map<String, Value>),
    Unparsed,
}

impl Extracted {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Extracted::Parsed(_))
    }

    /// The recovered object, or an empty map.
    pub fn into_map(self) -> Map<String, Value> {
        match self {
            Extracted::Parsed(map) => map,
            Extracted::Unparsed => Map::new(),
        }
    }
}

pub fn extract_json(text: &str) -> Extracted {
    let cleaned = THINK_BLOCK.replace_all(text, "");
    let cleaned = cleaned.trim();

    let fenced = JSON_FENCE
        .captures(cleaned)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());
    let outer = match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if end > start => Some(&cleaned[start..=end]),
        _ => None,
    };

    for candidate in fenced.into_iter().chain(outer).chain(Some(cleaned)) {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(candidate) {
            return Extracted::Parsed(map);
        }
    }

    debug!(chars = text.len(), "No JSON object recoverable from model output");
    Extracted::Unparsed
}

/// String field, trimmed; `None` when absent, null or not a string.
pub fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
}

/// List of strings; a bare string becomes a one-element list and non-string
/// items are rendered as JSON text.
pub fn string_list(map: &Map<String, Value>, key: &str) -> Vec<String> {
    match map.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parsed(text: &str) -> Value {
        Value::Object(extract_json(text).into_map())
    }

    #[test]
    fn strips_think_block_and_fence() {
        let text = "<think>reasoning</think>```json\n{\"sql\":\"SELECT 1\"}\n```";
        assert_eq!(parsed(text), json!({"sql": "SELECT 1"}));
    }

    #[test]
    fn think_block_spanning_lines_with_braces() {
        let text = "<think>\nmaybe {\"sql\": \"DROP\"}?\n</think>\n{\"sql\": \"SELECT 2\"}";
        assert_eq!(parsed(text), json!({"sql": "SELECT 2"}));
    }

    #[test]
    fn outermost_braces_in_prose() {
        let text = "Here is the plan: {\"steps\": [{\"step_id\": 1, \"description\": \"x\"}]} done.";
        assert_eq!(
            parsed(text),
            json!({"steps": [{"step_id": 1, "description": "x"}]})
        );
    }

    #[test]
    fn nested_object_inside_fence() {
        let text = "```json\n{\"a\": {\"b\": 1}}\n```";
        assert_eq!(parsed(text), json!({"a": {"b": 1}}));
    }

    #[test]
    fn malformed_input_yields_empty_map() {
        assert_eq!(extract_json("no json here"), Extracted::Unparsed);
        assert_eq!(extract_json("{not: valid"), Extracted::Unparsed);
        assert!(extract_json("").into_map().is_empty());
    }

    #[test]
    fn non_object_json_is_unparsed() {
        assert_eq!(extract_json("[1, 2, 3]"), Extracted::Unparsed);
        assert_eq!(extract_json("42"), Extracted::Unparsed);
    }

    #[test]
    fn string_helpers() {
        let map = extract_json(r#"{"summary": " ok ", "items": ["a", 2], "one": "b"}"#).into_map();
        assert_eq!(string_field(&map, "summary").as_deref(), Some("ok"));
        assert_eq!(string_field(&map, "missing"), None);
        assert_eq!(string_list(&map, "items"), vec!["a", "2"]);
        assert_eq!(string_list(&map, "one"), vec!["b"]);
        assert!(string_list(&map, "missing").is_empty());
    }
}
