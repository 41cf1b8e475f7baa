//! Single-key profile
//!
//! The behavior of deployments configured with one `GOOGLE_API_KEY`: a single
//! attempt, no quota handling, no error passthrough.

use super::attempt::Attempt;
use crate::credentials::CredentialPair;
use crate::metrics::Metrics;
use crate::network::{Upstream, UpstreamRequest};
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

/// Call the upstream once with `pair`. Any failure collapses to `None`.
pub async fn fetch_once(
    upstream: &dyn Upstream,
    pair: &CredentialPair,
    base_url: &Url,
    query: &str,
    metrics: &Metrics,
) -> Option<Value> {
    let request = UpstreamRequest::build(base_url, pair, query);
    debug!(url = request.redacted(), "Fetching search results");

    let attempt = Attempt::classify(upstream.fetch(&request).await);
    metrics.record_attempt(0, attempt.kind());

    match attempt {
        Attempt::Success(body) => Some(body),
        Attempt::Quota(body) | Attempt::Semantic(body) => {
            let detail = &body["error"];
            error!(error = %detail, "Error fetching from upstream");
            None
        }
        Attempt::Transport(e) => {
            error!(error = %e, "Error fetching from upstream");
            None
        }
    }
}
