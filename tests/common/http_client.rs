//! HTTP client helpers for tests.

use std::time::Duration;

use serde::Deserialize;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TestClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}: {1}")]
    UnexpectedStatus(u16, String),
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn health(&self) -> Result<HealthResponse, TestClientError> {
        let resp = self.client.get(self.url("/health")).send().await?;
        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            let status = resp.status().as_u16();
            Err(TestClientError::UnexpectedStatus(
                status,
                resp.text().await.unwrap_or_default(),
            ))
        }
    }

    /// Posts JSON and returns the status with the decoded body.
    pub async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<(u16, serde_json::Value), TestClientError> {
        let mut builder = self.client.post(self.url(path)).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.header("X-API-Key", key);
        }
        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let json = resp.json().await?;
        Ok((status, json))
    }
}
