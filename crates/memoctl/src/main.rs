//! memoctl - CLI client for the voice memo organizer
//!
//! Talks to a running memod over HTTP, or to the model API directly for model
//! listing and scenario runs.

use anyhow::{Context, Result};
use clap::Parser;
use memo_common::config::{load_dotenv, ServiceConfig};
use memo_common::{GeminiClient, OrganizeRequest, Organizer};
use memoctl::cli::{Cli, Commands};
use memoctl::client::MemodClient;
use memoctl::{logging, models, scenario};
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Organize { text, themes } => {
            logging::init_console();
            let client = MemodClient::new(&cli.server)?;
            let request = OrganizeRequest {
                text,
                current_themes: themes,
            };
            println!("Sending request to {}...", client.organize_url());
            println!("Payload: {}", serde_json::to_string(&request)?);

            let response = client.organize(&request).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);

            if response.get("commands").is_some() {
                println!("[OK] 'commands' field found in response.");
            } else {
                println!("[FAIL] 'commands' field missing.");
            }
        }

        Commands::Health => {
            logging::init_console();
            let health = MemodClient::new(&cli.server)?.health().await?;
            println!(
                "status: {}, service_ready: {}",
                health.status, health.service_ready
            );
        }

        Commands::Models { output } => {
            logging::init_console();
            load_dotenv();
            let config = ServiceConfig::load(cli.config.as_deref())?;
            let client = GeminiClient::from_env(&config.llm)
                .context("GOOGLE_API_KEY not found")?;

            let rendered = models::render_model_list(&client.list_models().await?);
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Done writing to {}", path.display());
                }
                None => print!("{}", rendered),
            }
        }

        Commands::Scenario {
            file,
            log_dir,
            delay_ms,
        } => {
            let log_path = logging::init_scenario(&log_dir)?;
            load_dotenv();
            info!("Starting scenario test...");

            let config = ServiceConfig::load(cli.config.as_deref())?;
            let organizer =
                Organizer::from_config(&config).context("failed to set up the model client")?;
            let steps = match file {
                Some(path) => scenario::load_scenario(&path)?,
                None => scenario::default_scenario(),
            };

            scenario::run_scenario(&organizer, &steps, Duration::from_millis(delay_ms)).await;
            info!("Log saved to: {}", log_path.display());
        }
    }

    Ok(())
}
