//! Application state shared across handlers

use crate::config::Settings;
use crate::metrics::Metrics;
use crate::network::{HttpClient, Upstream};
use crate::proxy::Proxy;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Search proxy
    pub proxy: Arc<Proxy>,
}

impl AppState {
    /// Create new application state backed by the real HTTP client
    pub fn new(settings: Settings, client: HttpClient) -> anyhow::Result<Self> {
        Self::with_upstream(settings, Arc::new(client))
    }

    /// Create new application state with any upstream implementation
    pub fn with_upstream(settings: Settings, upstream: Arc<dyn Upstream>) -> anyhow::Result<Self> {
        let metrics = Arc::new(Metrics::new());
        let proxy = Arc::new(Proxy::new(&settings, upstream, metrics)?);

        Ok(Self {
            settings: Arc::new(settings),
            proxy,
        })
    }
}
