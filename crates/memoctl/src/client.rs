//! HTTP client for communicating with memod.

use anyhow::{anyhow, Context, Result};
use memo_common::{HealthResponse, OrganizeRequest};
use serde_json::Value;
use std::time::Duration;

/// Client for a running memod
pub struct MemodClient {
    base_url: String,
    http: reqwest::Client,
}

impl MemodClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn organize_url(&self) -> String {
        format!("{}/api/organize", self.base_url)
    }

    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }

    /// POST /api/organize. Returns the body as raw JSON so unexpected shapes can still
    /// be inspected.
    pub async fn organize(&self, request: &OrganizeRequest) -> Result<Value> {
        let url = self.organize_url();
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| connect_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("HTTP {} from {}: {}", status, url, body));
        }
        response.json().await.context("response is not JSON")
    }

    /// GET /health
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = self.health_url();
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| connect_error(&url, e))?
            .error_for_status()?;
        response.json().await.context("invalid health response")
    }
}

fn connect_error(url: &str, e: reqwest::Error) -> anyhow::Error {
    if e.is_connect() {
        anyhow!("Cannot connect to memod at {}. Is the server running?", url)
    } else {
        anyhow!("Request to {} failed: {}", url, e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_strip_trailing_slash() {
        let client = MemodClient::new("http://127.0.0.1:8000/").unwrap();
        assert_eq!(client.organize_url(), "http://127.0.0.1:8000/api/organize");
        assert_eq!(client.health_url(), "http://127.0.0.1:8000/health");
    }
}
