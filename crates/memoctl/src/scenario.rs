//! Scenario runner
//!
//! Feeds a scripted sequence of utterances through the organizer in-process, carrying
//! themes forward the way the frontend does: every `add_note` becomes a
//! `"<summary>: <content>"` label for the next step.

use anyhow::{Context, Result};
use memo_common::{validate_commands, OrganizeOutcome, Organizer};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};

/// One scripted utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    pub step: u32,
    pub input: String,
    /// Card type the step is expected to produce (INFO, PROPOSAL, ...)
    #[serde(default)]
    pub expected_type: Option<String>,
}

/// What happened at one step
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub step: u32,
    pub command_count: usize,
    pub dropped_count: usize,
    /// Card types seen in the validated commands
    pub observed_types: Vec<String>,
    pub error: Option<String>,
}

impl StepReport {
    /// True when no expectation was set or a command of the expected type appeared
    pub fn matches(&self, expected: Option<&str>) -> bool {
        expected.map_or(true, |e| self.observed_types.iter().any(|t| t == e))
    }
}

/// Outcome of a full run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioReport {
    pub steps: Vec<StepReport>,
    /// Themes accumulated by the end of the run
    pub themes: Vec<String>,
}

/// Three-step meeting scenario used when no file is given
pub fn default_scenario() -> Vec<ScenarioStep> {
    vec![
        ScenarioStep {
            step: 1,
            input: "来週の火曜日に定例会議を設定したいのですが。".to_string(),
            expected_type: Some("PROPOSAL".to_string()),
        },
        ScenarioStep {
            step: 2,
            input: "参加者は全員必須でお願いします。".to_string(),
            expected_type: Some("INFO".to_string()),
        },
        ScenarioStep {
            step: 3,
            input: "あ、やっぱり時間は14時からで。".to_string(),
            expected_type: Some("PROPOSAL".to_string()),
        },
    ]
}

/// Load a scenario from a JSON array of steps
pub fn load_scenario(path: &Path) -> Result<Vec<ScenarioStep>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse scenario {}", path.display()))
}

/// Run every step in order, pausing `delay` between steps
pub async fn run_scenario(
    organizer: &Organizer,
    steps: &[ScenarioStep],
    delay: Duration,
) -> ScenarioReport {
    let mut report = ScenarioReport::default();

    for (i, item) in steps.iter().enumerate() {
        info!("--- Step {} ---", item.step);
        info!("Input: {}", item.input);

        let step_report = match organizer.organize(&item.input, &report.themes).await {
            OrganizeOutcome::Failed { error, .. } => {
                error!("Error: {}", error);
                StepReport {
                    step: item.step,
                    command_count: 0,
                    dropped_count: 0,
                    observed_types: Vec::new(),
                    error: Some(error),
                }
            }
            OrganizeOutcome::Parsed { commands, .. } => {
                let validation = validate_commands(commands);
                match serde_json::to_string_pretty(&validation.kept) {
                    Ok(pretty) => info!("Commands: {}", pretty),
                    Err(e) => warn!("Could not render commands: {}", e),
                }
                for dropped in &validation.dropped {
                    warn!("Dropped command #{}: {}", dropped.index, dropped.reason);
                }

                report
                    .themes
                    .extend(validation.kept.iter().filter_map(|c| c.theme_label()));

                StepReport {
                    step: item.step,
                    command_count: validation.kept.len(),
                    dropped_count: validation.dropped.len(),
                    observed_types: validation
                        .kept
                        .iter()
                        .filter_map(|c| c.args.text_field("type").map(str::to_string))
                        .collect(),
                    error: None,
                }
            }
        };

        if !step_report.matches(item.expected_type.as_deref()) {
            warn!(
                "Step {}: expected type {:?}, observed {:?}",
                item.step, item.expected_type, step_report.observed_types
            );
        }
        report.steps.push(step_report);

        if i + 1 < steps.len() && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    info!("Scenario completed: {} step(s)", report.steps.len());
    report
}
