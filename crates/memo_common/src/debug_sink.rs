//! Optional append-only record of raw model responses.

use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Appends each input and raw model response to a file. Failures are logged and
/// otherwise ignored; the sink never affects a request.
#[derive(Debug, Clone)]
pub struct DebugSink {
    path: PathBuf,
}

impl DebugSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn record(&self, input: &str, raw_response: &str) {
        if let Err(e) = self.append(&format_entry(input, raw_response)).await {
            warn!("Debug sink write to {} failed: {}", self.path.display(), e);
        }
    }

    async fn append(&self, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(entry.as_bytes()).await?;
        file.flush().await
    }
}

fn format_entry(input: &str, raw_response: &str) -> String {
    format!(
        "\n--- [{}] Input: {} ---\nRaw Response: {}\n",
        Utc::now().to_rfc3339(),
        input,
        raw_response
    )
}
