//! memod - voice memo organizer daemon
//!
//! Serves `/api/organize` and `/health` on top of the Gemini API.

use anyhow::{Context, Result};
use clap::Parser;
use memo_common::config::{load_dotenv, ServiceConfig};
use memod::server;
use memod::state::AppState;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "memod")]
#[command(about = "Voice memo organizer backend", long_about = None)]
#[command(version)]
struct Args {
    /// Config file (overrides $MEMOD_CONFIG and ./memod.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// `RUST_LOG` when set, otherwise `info`
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    fmt().with_env_filter(env_filter()).with_target(true).init();
    load_dotenv();

    info!("memod v{} starting", env!("CARGO_PKG_VERSION"));

    let config = ServiceConfig::load(args.config.as_deref()).context("failed to load config")?;
    let state = AppState::from_config(&config);

    server::run(state, &config.server).await
}
