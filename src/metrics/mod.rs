//! Metrics collection module
//!
//! Tracks upstream attempts and their outcomes per credential index.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Classified result of a single upstream attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptKind {
    Success,
    Quota,
    Semantic,
    Transport,
}

/// Global metrics collector
#[derive(Default)]
pub struct Metrics {
    /// Total search count
    total_searches: AtomicU64,
    /// Counters keyed by credential index
    credentials: RwLock<BTreeMap<usize, CredentialStats>>,
}

impl Metrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment total search count
    pub fn inc_search(&self) {
        self.total_searches.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one upstream attempt made with the pair at `index`
    pub fn record_attempt(&self, index: usize, kind: AttemptKind) {
        let mut credentials = self
            .credentials
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let stats = credentials.entry(index).or_default();
        stats.attempts += 1;
        match kind {
            AttemptKind::Success => stats.successes += 1,
            AttemptKind::Quota => stats.quota_errors += 1,
            AttemptKind::Semantic => stats.semantic_errors += 1,
            AttemptKind::Transport => stats.transport_errors += 1,
        }
    }

    /// Get total searches
    pub fn get_total_searches(&self) -> u64 {
        self.total_searches.load(Ordering::Relaxed)
    }

    /// Counters for one credential index
    pub fn get_credential_stats(&self, index: usize) -> CredentialStats {
        self.credentials
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&index)
            .cloned()
            .unwrap_or_default()
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        let credentials = self
            .credentials
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(index, stats)| (*index, stats.clone()))
            .collect();

        MetricsSnapshot {
            total_searches: self.get_total_searches(),
            credentials,
        }
    }
}

/// Statistics for a single credential pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CredentialStats {
    pub attempts: u64,
    pub successes: u64,
    pub quota_errors: u64,
    pub semantic_errors: u64,
    pub transport_errors: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_searches: u64,
    pub credentials: BTreeMap<usize, CredentialStats>,
}
