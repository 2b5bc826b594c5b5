//! Logging setup for memoctl
//!
//! Console logging by default. The scenario runner also tees everything into a
//! timestamped file under its log directory.

use anyhow::{Context, Result};
use chrono::Local;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{fmt, EnvFilter};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Console-only logging
pub fn init_console() {
    fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .init();
}

/// Path of a new scenario log inside `log_dir`
pub fn scenario_log_path(log_dir: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    log_dir.join(format!("scenario_test_{}.log", timestamp))
}

/// Log to stdout and to a fresh file in `log_dir`; returns the file path
pub fn init_scenario(log_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log dir {}", log_dir.display()))?;
    let path = scenario_log_path(log_dir);
    let file = File::create(&path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;

    fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stdout.and(Arc::new(file)))
        .init();

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_log_path_shape() {
        let path = scenario_log_path(Path::new("logs"));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(path.starts_with("logs"));
        assert!(name.starts_with("scenario_test_"));
        assert!(name.ends_with(".log"));
    }
}
