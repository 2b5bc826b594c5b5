//! Model output cleanup.
//!
//! Generative models sometimes wrap JSON in markdown fences even when JSON output was
//! requested. This strips a single fence pair and decodes the top-level shape. Parse
//! failures never surface as errors: the caller just sees an empty command list.

use serde_json::{Map, Value};
use tracing::error;

/// Top-level shape of a parsed model response
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    /// Bare array, treated as the command list
    Array(Vec<Value>),
    /// Object, expected to carry a `commands` field
    Object(Map<String, Value>),
    /// Valid JSON that is neither array nor object
    Scalar(Value),
    /// Not valid JSON after fence stripping
    Malformed,
}

impl ResponseShape {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => ResponseShape::Array(items),
            Value::Object(map) => ResponseShape::Object(map),
            other => ResponseShape::Scalar(other),
        }
    }

    /// Normalize to an object. Arrays become `{"commands": [...]}`, objects pass
    /// through untouched, anything else becomes `{"commands": []}`.
    pub fn into_payload(self) -> Map<String, Value> {
        match self {
            ResponseShape::Object(map) => map,
            ResponseShape::Array(items) => commands_payload(items),
            ResponseShape::Scalar(_) | ResponseShape::Malformed => commands_payload(Vec::new()),
        }
    }

    /// The command list, defaulting to empty when absent or not an array
    pub fn into_commands(self) -> Vec<Value> {
        match self.into_payload().remove("commands") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        }
    }
}

fn commands_payload(items: Vec<Value>) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("commands".to_string(), Value::Array(items));
    map
}

/// Strip one leading fence (```json or ```) and one trailing fence
pub fn strip_code_fence(text: &str) -> &str {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

/// Strip fencing and decode the response shape
pub fn parse_response(text: &str) -> ResponseShape {
    let cleaned = strip_code_fence(text);
    match serde_json::from_str::<Value>(cleaned) {
        Ok(value) => ResponseShape::from_value(value),
        Err(e) => {
            error!("JSON parse error: {}, raw text: {}", e, text);
            ResponseShape::Malformed
        }
    }
}

/// Convenience: raw model text straight to its command list
pub fn extract_commands(text: &str) -> Vec<Value> {
    parse_response(text).into_commands()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_json_fence() {
        let text = "```json\n{\"commands\": []}\n```";
        assert_eq!(strip_code_fence(text), "{\"commands\": []}");
    }

    #[test]
    fn test_strip_plain_fence() {
        let text = "  ```\n[1, 2]\n```  ";
        assert_eq!(strip_code_fence(text), "[1, 2]");
    }

    #[test]
    fn test_unfenced_text_untouched() {
        assert_eq!(strip_code_fence(" {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn test_fenced_object_equals_unfenced() {
        let body = r#"{"commands":[{"action":"add_note","args":{"summary":"s","content":"c"}}]}"#;
        let fenced = format!("```json\n{}\n```", body);
        assert_eq!(parse_response(&fenced), parse_response(body));
        assert!(matches!(parse_response(body), ResponseShape::Object(_)));
    }

    #[test]
    fn test_malformed_yields_empty_commands() {
        let shape = parse_response("```json\n{\"commands\": [\n```");
        assert_eq!(shape, ResponseShape::Malformed);
        assert_eq!(shape.into_payload(), commands_payload(Vec::new()));
        assert!(extract_commands("not json at all").is_empty());
    }

    #[test]
    fn test_top_level_array_is_wrapped() {
        let shape = parse_response(r#"[{"action": "add_note"}]"#);
        let payload = shape.into_payload();
        assert_eq!(payload["commands"], json!([{"action": "add_note"}]));
    }

    #[test]
    fn test_object_without_commands_is_empty() {
        assert!(extract_commands(r#"{"notes": [1]}"#).is_empty());
        assert!(extract_commands(r#"{"commands": "nope"}"#).is_empty());
    }

    #[test]
    fn test_object_passes_through_as_is() {
        let payload = parse_response(r#"{"commands": [], "themes": ["Work"]}"#).into_payload();
        assert_eq!(payload["themes"], json!(["Work"]));
    }

    #[test]
    fn test_scalar_yields_empty_commands() {
        assert_eq!(parse_response("42"), ResponseShape::Scalar(json!(42)));
        assert!(extract_commands("\"text\"").is_empty());
    }
}
