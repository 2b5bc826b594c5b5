//! Command data model shared by the daemon and the control CLI.
//!
//! A `Command` is one structured instruction extracted from free-form text by the model:
//! add a note card, update the theme graph, or an `unknown` catch-all.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Sentinel returned in `raw_response` when no model backend is configured
pub const SERVICE_UNAVAILABLE: &str = "Service Unavailable";

/// Default importance for a note card when the model omits it
pub const DEFAULT_IMPORTANCE: f64 = 0.5;

/// Default card category
pub const DEFAULT_NOTE_TYPE: &str = "INFO";

// ============================================================================
// Action
// ============================================================================

/// Closed set of command tags the frontend understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    AddNote,
    UpdateGraph,
    Unknown,
}

impl ActionType {
    /// Wire tag for this action
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::AddNote => "add_note",
            ActionType::UpdateGraph => "update_graph",
            ActionType::Unknown => "unknown",
        }
    }

    /// Parse a wire tag. Returns `None` for anything outside the closed set.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "add_note" => Some(ActionType::AddNote),
            "update_graph" => Some(ActionType::UpdateGraph),
            "unknown" => Some(ActionType::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Arguments
// ============================================================================

/// Structured arguments for a note card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteArgs {
    /// Card title
    pub summary: String,

    /// Card body
    pub content: String,

    #[serde(default)]
    pub keywords: Vec<String>,

    /// Must lie in [0.0, 1.0]
    #[serde(default = "default_importance")]
    pub importance: f64,

    /// Card category (INFO, PROPOSAL, ...)
    #[serde(rename = "type", default = "default_note_type")]
    pub kind: String,
}

fn default_importance() -> f64 {
    DEFAULT_IMPORTANCE
}

fn default_note_type() -> String {
    DEFAULT_NOTE_TYPE.to_string()
}

/// Command arguments: a well-typed note, or whatever mapping the model produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandArgs {
    Note(NoteArgs),
    Loose(Map<String, Value>),
}

impl CommandArgs {
    pub fn as_note(&self) -> Option<&NoteArgs> {
        match self {
            CommandArgs::Note(note) => Some(note),
            CommandArgs::Loose(_) => None,
        }
    }

    /// Read a string field regardless of which variant holds it
    pub fn text_field(&self, key: &str) -> Option<&str> {
        match self {
            CommandArgs::Note(note) => match key {
                "summary" => Some(note.summary.as_str()),
                "content" => Some(note.content.as_str()),
                "type" => Some(note.kind.as_str()),
                _ => None,
            },
            CommandArgs::Loose(map) => map.get(key).and_then(Value::as_str),
        }
    }
}

// ============================================================================
// Command
// ============================================================================

/// A validated command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub action: ActionType,
    pub args: CommandArgs,
    #[serde(default)]
    pub original_text: Option<String>,
}

impl Command {
    /// Theme label carried forward as context for the next request
    pub fn theme_label(&self) -> Option<String> {
        if self.action != ActionType::AddNote {
            return None;
        }
        let summary = self.args.text_field("summary").unwrap_or("");
        let content = self.args.text_field("content").unwrap_or("");
        Some(format!("{}: {}", summary, content))
    }
}

// ============================================================================
// HTTP payloads
// ============================================================================

/// Body of `POST /api/organize`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeRequest {
    pub text: String,
    #[serde(default)]
    pub current_themes: Vec<String>,
}

/// Response of `POST /api/organize`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeResponse {
    pub commands: Vec<Command>,
    pub raw_response: Option<String>,
    pub processing_time: Option<f64>,
}

impl OrganizeResponse {
    /// Degraded response when no model backend is available
    pub fn unavailable() -> Self {
        Self {
            commands: Vec::new(),
            raw_response: Some(SERVICE_UNAVAILABLE.to_string()),
            processing_time: None,
        }
    }

    /// In-band error response; the HTTP status stays 200
    pub fn error(error: &str, processing_time: f64) -> Self {
        Self {
            commands: Vec::new(),
            raw_response: Some(format!("Error: {}", error)),
            processing_time: Some(processing_time),
        }
    }
}

/// Response of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service_ready: bool,
}

impl HealthResponse {
    pub fn new(service_ready: bool) -> Self {
        Self {
            status: "ok".to_string(),
            service_ready,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_tags_roundtrip_through_serde() {
        for action in [ActionType::AddNote, ActionType::UpdateGraph, ActionType::Unknown] {
            let value = serde_json::to_value(action).unwrap();
            assert_eq!(value, json!(action.as_str()));
            assert_eq!(ActionType::from_tag(action.as_str()), Some(action));
        }
        assert_eq!(ActionType::from_tag("delete_everything"), None);
    }

    #[test]
    fn test_note_args_defaults() {
        let args: NoteArgs =
            serde_json::from_value(json!({"summary": "Meeting", "content": "Tuesday"})).unwrap();
        assert!(args.keywords.is_empty());
        assert_eq!(args.importance, DEFAULT_IMPORTANCE);
        assert_eq!(args.kind, "INFO");
    }

    #[test]
    fn test_command_serializes_type_field_and_null_original_text() {
        let cmd = Command {
            action: ActionType::AddNote,
            args: CommandArgs::Note(NoteArgs {
                summary: "Meeting".to_string(),
                content: "Next Tuesday".to_string(),
                keywords: vec!["meeting".to_string()],
                importance: 0.8,
                kind: "PROPOSAL".to_string(),
            }),
            original_text: None,
        };
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(value["action"], "add_note");
        assert_eq!(value["args"]["type"], "PROPOSAL");
        assert_eq!(value["args"]["importance"], 0.8);
        assert!(value["original_text"].is_null());
    }

    #[test]
    fn test_theme_label_only_for_add_note() {
        let mut map = Map::new();
        map.insert("summary".to_string(), json!("Shopping"));
        let cmd = Command {
            action: ActionType::AddNote,
            args: CommandArgs::Loose(map),
            original_text: None,
        };
        assert_eq!(cmd.theme_label().as_deref(), Some("Shopping: "));

        let graph = Command {
            action: ActionType::UpdateGraph,
            ..cmd
        };
        assert!(graph.theme_label().is_none());
    }

    #[test]
    fn test_unavailable_response_shape() {
        let value = serde_json::to_value(OrganizeResponse::unavailable()).unwrap();
        assert_eq!(
            value,
            json!({"commands": [], "raw_response": "Service Unavailable", "processing_time": null})
        );
    }

    #[test]
    fn test_request_themes_default_to_empty() {
        let req: OrganizeRequest = serde_json::from_value(json!({"text": "hi"})).unwrap();
        assert!(req.current_themes.is_empty());
    }
}
