//! Shared library for the voice memo organizer.
//!
//! Holds everything between the HTTP surface and the model API: the command data model,
//! prompt assembly, the LLM client seam, response sanitizing and command validation.

pub mod command;
pub mod config;
pub mod debug_sink;
pub mod llm;
pub mod organizer;
pub mod prompt;
pub mod sanitize;
pub mod validate;

pub use command::{
    ActionType, Command, CommandArgs, HealthResponse, NoteArgs, OrganizeRequest,
    OrganizeResponse, SERVICE_UNAVAILABLE,
};
pub use config::ServiceConfig;
pub use llm::{FakeLlmClient, GeminiClient, LlmClient, LlmError};
pub use organizer::{OrganizeOutcome, Organizer};
pub use validate::{validate_commands, CommandRejection, DroppedCommand, ValidationReport};
