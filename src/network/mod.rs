//! HTTP networking module
//!
//! Provides the upstream seam used by the proxy and its reqwest implementation.

mod client;
mod request;

pub use client::HttpClient;
pub use request::UpstreamRequest;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// A failure to obtain a JSON body from the upstream at all
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("request failed: {0}")]
    Request(reqwest::Error),
    #[error("response was not valid json: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response body was null")]
    NullBody,
}

impl TransportError {
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Request(err.without_url())
        }
    }
}

/// Something that can execute an upstream search request
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Issue one request and decode its JSON body, whatever the HTTP status
    async fn fetch(&self, request: &UpstreamRequest) -> Result<Value, TransportError>;
}
