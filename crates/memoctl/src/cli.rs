//! CLI - Command-line argument parsing
//!
//! Defines the CLI structure using clap; execution lives in `main.rs`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default daemon address
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";

/// Voice memo organizer CLI
#[derive(Parser)]
#[command(name = "memoctl")]
#[command(about = "Voice memo organizer - debugging and scenario tools", long_about = None)]
#[command(version)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Base URL of a running memod
    #[arg(long, global = true, default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Config file for commands that talk to the model directly
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Send text to /api/organize and print the response
    Organize {
        /// Text to organize
        text: String,

        /// Prior context label (repeatable)
        #[arg(long = "theme")]
        themes: Vec<String>,
    },

    /// Check daemon health
    Health,

    /// List models that support content generation
    Models {
        /// Write the list to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run a multi-step scenario directly against the model
    Scenario {
        /// Scenario JSON file (built-in scenario when omitted)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Directory for the scenario log
        #[arg(long, default_value = "logs")]
        log_dir: PathBuf,

        /// Pause between steps, in milliseconds
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,
    },
}
