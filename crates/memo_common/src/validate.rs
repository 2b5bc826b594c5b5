//! Command validation.
//!
//! Model output is loosely typed. Each entry gets its `action` normalized to the closed
//! tag set. Args are decoded as a note when they fit and kept as a plain mapping when
//! they don't. Only structural problems drop an entry; its siblings are unaffected.

use crate::command::{ActionType, Command, CommandArgs, NoteArgs};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Why a single command entry was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandRejection {
    #[error("command is not an object (got {0})")]
    NotAnObject(&'static str),

    #[error("command has no args")]
    MissingArgs,

    #[error("args must be an object (got {0})")]
    ArgsNotAnObject(&'static str),

    #[error("original_text must be a string (got {0})")]
    InvalidOriginalText(&'static str),
}

/// An entry that failed validation
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedCommand {
    /// Position in the input list
    pub index: usize,
    /// Entry as received, after action normalization
    pub raw: Value,
    pub reason: CommandRejection,
}

/// Result of validating a batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    /// Valid commands, in input order
    pub kept: Vec<Command>,
    pub dropped: Vec<DroppedCommand>,
}

/// Set `action` to a recognized tag, coercing missing or unknown values to `unknown`
pub fn normalize_action(entry: &mut Map<String, Value>) -> ActionType {
    let action = entry
        .get("action")
        .and_then(Value::as_str)
        .and_then(ActionType::from_tag)
        .unwrap_or(ActionType::Unknown);
    entry.insert(
        "action".to_string(),
        Value::String(action.as_str().to_string()),
    );
    action
}

/// Validate a single entry
pub fn validate_command(entry: &mut Value) -> Result<Command, CommandRejection> {
    let kind = kind_of(entry);
    let map = entry
        .as_object_mut()
        .ok_or(CommandRejection::NotAnObject(kind))?;
    let action = normalize_action(map);

    let args = match map.get("args") {
        None | Some(Value::Null) => return Err(CommandRejection::MissingArgs),
        Some(Value::Object(args)) => decode_args(args),
        Some(other) => return Err(CommandRejection::ArgsNotAnObject(kind_of(other))),
    };

    let original_text = match map.get("original_text") {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => return Err(CommandRejection::InvalidOriginalText(kind_of(other))),
    };

    Ok(Command {
        action,
        args,
        original_text,
    })
}

/// Validate every entry, keeping the good ones in order
pub fn validate_commands(entries: Vec<Value>) -> ValidationReport {
    let mut report = ValidationReport::default();
    for (index, mut entry) in entries.into_iter().enumerate() {
        match validate_command(&mut entry) {
            Ok(command) => report.kept.push(command),
            Err(reason) => report.dropped.push(DroppedCommand {
                index,
                raw: entry,
                reason,
            }),
        }
    }
    report
}

/// Why a mapping could not be read as a note
#[derive(Debug, Error)]
enum NoteDecodeError {
    #[error("{0}")]
    Shape(#[from] serde_json::Error),

    #[error("importance {0} is outside [0.0, 1.0]")]
    ImportanceOutOfRange(f64),
}

fn decode_note(args: &Map<String, Value>) -> Result<NoteArgs, NoteDecodeError> {
    let note: NoteArgs = serde_json::from_value(Value::Object(args.clone()))?;
    if !(0.0..=1.0).contains(&note.importance) {
        return Err(NoteDecodeError::ImportanceOutOfRange(note.importance));
    }
    Ok(note)
}

/// A complete, in-range note decodes typed. Any other mapping is kept as-is.
fn decode_args(args: &Map<String, Value>) -> CommandArgs {
    match decode_note(args) {
        Ok(note) => CommandArgs::Note(note),
        Err(e) => {
            if args.contains_key("summary") || args.contains_key("content") {
                debug!("Keeping args as a loose mapping: {}", e);
            }
            CommandArgs::Loose(args.clone())
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_action_becomes_unknown() {
        let mut entry = json!({"args": {"foo": "bar"}});
        let cmd = validate_command(&mut entry).unwrap();
        assert_eq!(cmd.action, ActionType::Unknown);
        assert_eq!(entry["action"], "unknown");
    }

    #[test]
    fn test_unrecognized_action_is_coerced_not_dropped() {
        let mut entry = json!({"action": "delete_all", "args": {"summary": "s", "content": "c"}});
        let cmd = validate_command(&mut entry).unwrap();
        assert_eq!(cmd.action, ActionType::Unknown);
        assert!(cmd.args.as_note().is_some());
    }

    #[test]
    fn test_non_string_action_is_coerced() {
        let mut entry = json!({"action": 7, "args": {}});
        assert_eq!(validate_command(&mut entry).unwrap().action, ActionType::Unknown);
    }

    #[test]
    fn test_importance_out_of_range_kept_loose() {
        let mut entry = json!({
            "action": "add_note",
            "args": {"summary": "s", "content": "c", "importance": 1.5}
        });
        let cmd = validate_command(&mut entry).unwrap();
        assert_eq!(cmd.action, ActionType::AddNote);
        match cmd.args {
            CommandArgs::Loose(map) => assert_eq!(map["importance"], json!(1.5)),
            other => panic!("expected loose args, got {:?}", other),
        }
    }

    #[test]
    fn test_importance_bounds_inclusive() {
        for importance in [0.0, 1.0] {
            let mut entry = json!({
                "action": "add_note",
                "args": {"summary": "s", "content": "c", "importance": importance}
            });
            let cmd = validate_command(&mut entry).unwrap();
            assert!(cmd.args.as_note().is_some());
        }
    }

    #[test]
    fn test_wrong_field_type_kept_loose() {
        let mut entry = json!({
            "action": "add_note",
            "args": {"summary": "s", "content": "c", "keywords": "not-a-list"}
        });
        let cmd = validate_command(&mut entry).unwrap();
        assert!(cmd.args.as_note().is_none());
        assert_eq!(cmd.args.text_field("summary"), Some("s"));
        match cmd.args {
            CommandArgs::Loose(map) => assert_eq!(map["keywords"], json!("not-a-list")),
            other => panic!("expected loose args, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_args_kept_loose() {
        let mut entry = json!({"action": "update_graph", "args": {"nodes": ["a", "b"]}});
        let cmd = validate_command(&mut entry).unwrap();
        assert_eq!(cmd.action, ActionType::UpdateGraph);
        assert!(matches!(cmd.args, CommandArgs::Loose(_)));
    }

    #[test]
    fn test_args_must_be_object() {
        let mut missing = json!({"action": "add_note"});
        assert_eq!(
            validate_command(&mut missing),
            Err(CommandRejection::MissingArgs)
        );
        let mut list = json!({"action": "add_note", "args": [1, 2]});
        assert_eq!(
            validate_command(&mut list),
            Err(CommandRejection::ArgsNotAnObject("array"))
        );
    }

    #[test]
    fn test_original_text_must_be_string() {
        let mut ok = json!({"action": "add_note", "args": {}, "original_text": "raw"});
        assert_eq!(
            validate_command(&mut ok).unwrap().original_text.as_deref(),
            Some("raw")
        );
        let mut bad = json!({"action": "add_note", "args": {}, "original_text": 3});
        assert_eq!(
            validate_command(&mut bad),
            Err(CommandRejection::InvalidOriginalText("number"))
        );
    }

    #[test]
    fn test_batch_keeps_order_and_reports_drops() {
        let entries = vec![
            json!({"action": "add_note", "args": {"summary": "first", "content": "a"}}),
            json!("just a string"),
            json!({"action": "add_note", "args": {"summary": "odd", "content": "b", "importance": -0.1}}),
            json!({"action": "add_note", "args": null}),
            json!({"action": "update_graph", "args": {"edge": ["x", "y"]}}),
        ];
        let report = validate_commands(entries);

        assert_eq!(report.kept.len(), 3);
        assert_eq!(report.kept[0].args.text_field("summary"), Some("first"));
        assert_eq!(report.kept[1].args.text_field("summary"), Some("odd"));
        assert!(report.kept[1].args.as_note().is_none());
        assert_eq!(report.kept[2].action, ActionType::UpdateGraph);

        let dropped: Vec<usize> = report.dropped.iter().map(|d| d.index).collect();
        assert_eq!(dropped, vec![1, 3]);
        assert_eq!(report.dropped[0].reason, CommandRejection::NotAnObject("string"));
        assert_eq!(report.dropped[1].reason, CommandRejection::MissingArgs);
    }
}
