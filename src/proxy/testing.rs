//! In-memory upstream for driving the proxy without HTTP

use crate::network::{TransportError, Upstream, UpstreamRequest};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays a fixed list of results, one per call, and records requested URLs
pub struct ScriptedUpstream {
    script: Mutex<VecDeque<Result<Value, TransportError>>>,
    urls: Mutex<Vec<String>>,
}

impl ScriptedUpstream {
    pub fn new(script: Vec<Result<Value, TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.urls.lock().unwrap().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Upstream for ScriptedUpstream {
    async fn fetch(&self, request: &UpstreamRequest) -> Result<Value, TransportError> {
        self.urls.lock().unwrap().push(request.url().to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("upstream called more often than scripted")
    }
}
