//! Thin HTTP client for the LuxPulse API.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde_json::Value;

const CORRELATION_HEADER: &str = "x-correlation-id";

pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { base_url, http })
    }

    /// POST `body` to `path` and return the decoded JSON response.
    pub async fn post(&self, path: &str, body: &Value, correlation_id: &str) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .post(&url)
            .header(CORRELATION_HEADER, correlation_id)
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {url} failed"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("server returned {}: {}", status, body);
        }

        resp.json().await.context("failed to parse response body")
    }
}
