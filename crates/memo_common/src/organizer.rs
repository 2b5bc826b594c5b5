//! Organize service: prompt assembly, the model call and response sanitizing.
//!
//! Model failures never propagate. They come back as `OrganizeOutcome::Failed` with the
//! stringified error as the raw response.

use crate::config::ServiceConfig;
use crate::debug_sink::DebugSink;
use crate::llm::{GeminiClient, LlmClient, LlmError};
use crate::prompt::{build_user_message, load_system_instruction};
use crate::sanitize::parse_response;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

/// Result of one organize call
#[derive(Debug, Clone, PartialEq)]
pub enum OrganizeOutcome {
    /// The model answered; `commands` are still unvalidated
    Parsed {
        commands: Vec<Value>,
        raw_response: String,
    },
    /// Transport or API failure
    Failed { error: String, raw_response: String },
}

impl OrganizeOutcome {
    fn from_error(e: &LlmError) -> Self {
        let message = e.to_string();
        OrganizeOutcome::Failed {
            error: message.clone(),
            raw_response: message,
        }
    }
}

/// Turns free-form text into candidate commands via the model
pub struct Organizer {
    client: Arc<dyn LlmClient>,
    system_instruction: String,
    debug_sink: Option<DebugSink>,
}

impl Organizer {
    pub fn new(client: Arc<dyn LlmClient>, system_instruction: impl Into<String>) -> Self {
        Self {
            client,
            system_instruction: system_instruction.into(),
            debug_sink: None,
        }
    }

    pub fn with_debug_sink(mut self, sink: DebugSink) -> Self {
        self.debug_sink = Some(sink);
        self
    }

    /// Build the production organizer from config and `GOOGLE_API_KEY`
    pub fn from_config(config: &ServiceConfig) -> Result<Self, LlmError> {
        let client = GeminiClient::from_env(&config.llm)?;
        let system_instruction = load_system_instruction(&config.llm.system_prompt_path);
        let mut organizer = Self::new(Arc::new(client), system_instruction);
        if let Some(path) = &config.debug.log_path {
            info!("Debug sink enabled at {}", path.display());
            organizer = organizer.with_debug_sink(DebugSink::new(path));
        }
        Ok(organizer)
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub async fn organize(&self, text: &str, current_themes: &[String]) -> OrganizeOutcome {
        let user_message = build_user_message(text, current_themes);

        let raw_response = match self
            .client
            .generate(&self.system_instruction, &user_message)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                error!("LLM API error ({}): {}", self.client.model(), e);
                return OrganizeOutcome::from_error(&e);
            }
        };

        if let Some(sink) = &self.debug_sink {
            sink.record(text, &raw_response).await;
        }

        OrganizeOutcome::Parsed {
            commands: parse_response(&raw_response).into_commands(),
            raw_response,
        }
    }
}
