//! HTTP client for calling the search API

use super::request::UpstreamRequest;
use super::{TransportError, Upstream};
use crate::config::UpstreamSettings;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// HTTP client wrapper with CSE-Proxy specific configuration
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> anyhow::Result<Self> {
        Self::with_settings(&UpstreamSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &UpstreamSettings) -> anyhow::Result<Self> {
        let timeout = settings.timeout()?;
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("cse-proxy/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, timeout })
    }

    /// Per-attempt timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Upstream for HttpClient {
    async fn fetch(&self, request: &UpstreamRequest) -> Result<Value, TransportError> {
        let response = self
            .client
            .get(request.url())
            .header("Accept", "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;

        // The body decides the outcome; quota errors arrive as HTTP 429 with JSON.
        let text = response.text().await.map_err(TransportError::from_reqwest)?;
        Ok(serde_json::from_str(&text)?)
    }
}
