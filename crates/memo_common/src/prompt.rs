//! Prompt assembly for the organize call.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{error, info, warn};

/// Used when the system instruction file cannot be read
pub const DEFAULT_SYSTEM_INSTRUCTION: &str =
    "You are a helpful assistant. Output JSON commands.";

/// Build the user message: the raw input plus the themes established so far
pub fn build_user_message(text: &str, current_themes: &[String]) -> String {
    let themes = serde_json::to_string(current_themes).unwrap_or_else(|_| "[]".to_string());
    format!("Input Text: \"{}\"\nCurrent Themes: {}\n", text, themes)
}

/// Load the system instruction from disk, falling back to the built-in default
pub fn load_system_instruction(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(contents) if !contents.trim().is_empty() => {
            info!("Loaded system instruction from {}", path.display());
            contents
        }
        Ok(_) => {
            warn!(
                "System instruction at {} is empty, using default",
                path.display()
            );
            DEFAULT_SYSTEM_INSTRUCTION.to_string()
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(
                "System instruction not found at {}, using default",
                path.display()
            );
            DEFAULT_SYSTEM_INSTRUCTION.to_string()
        }
        Err(e) => {
            error!(
                "Failed to load system instruction from {}: {}",
                path.display(),
                e
            );
            DEFAULT_SYSTEM_INSTRUCTION.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_user_message_embeds_text_and_themes() {
        let themes = vec!["Work".to_string(), "買い物".to_string()];
        let msg = build_user_message("Set up a meeting", &themes);
        assert!(msg.contains("Input Text: \"Set up a meeting\""));
        // Non-ASCII themes stay readable
        assert!(msg.contains("Current Themes: [\"Work\",\"買い物\"]"));
    }

    #[test]
    fn test_user_message_empty_themes() {
        let msg = build_user_message("hello", &[]);
        assert!(msg.ends_with("Current Themes: []\n"));
    }

    #[test]
    fn test_load_system_instruction_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Return commands as JSON.").unwrap();
        let loaded = load_system_instruction(file.path());
        assert_eq!(loaded.trim(), "Return commands as JSON.");
    }

    #[test]
    fn test_load_system_instruction_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_system_instruction(&dir.path().join("absent.md"));
        assert_eq!(loaded, DEFAULT_SYSTEM_INSTRUCTION);
    }
}
