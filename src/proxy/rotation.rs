//! Credential rotation
//!
//! Tries each credential pair in pool order until one produces a result that
//! is not a quota error. Transitions are expressed by [`RotationState::step`],
//! which performs no I/O; [`rotate`] drives it against an [`Upstream`].

use super::attempt::Attempt;
use crate::credentials::CredentialPool;
use crate::metrics::Metrics;
use crate::network::{Upstream, UpstreamRequest};
use serde_json::Value;
use tracing::{error, info, warn};
use url::Url;

/// Where the rotation loop currently is
#[derive(Debug, Clone, PartialEq)]
pub enum RotationState {
    /// About to call the pair at this index
    Trying(usize),
    Finished(RotationOutcome),
}

/// Terminal states of the rotation loop
#[derive(Debug, Clone, PartialEq)]
pub enum RotationOutcome {
    /// A pair returned a usable payload
    Succeeded(Value),
    /// The last pair hit its quota
    QuotaExhausted,
    /// A pair returned a non-quota error; the payload is forwarded as-is
    SemanticError(Value),
    /// The last pair failed at the transport level
    TransportExhausted,
}

impl RotationState {
    /// Advance by one attempt result. Finished states are left unchanged.
    pub fn step(self, attempt: &Attempt, pool_len: usize) -> Self {
        let index = match self {
            RotationState::Trying(index) => index,
            finished => return finished,
        };
        let is_last = index + 1 >= pool_len;

        match attempt {
            Attempt::Success(body) => {
                RotationState::Finished(RotationOutcome::Succeeded(body.clone()))
            }
            Attempt::Semantic(body) => {
                RotationState::Finished(RotationOutcome::SemanticError(body.clone()))
            }
            Attempt::Quota(_) if is_last => {
                RotationState::Finished(RotationOutcome::QuotaExhausted)
            }
            Attempt::Transport(_) if is_last => {
                RotationState::Finished(RotationOutcome::TransportExhausted)
            }
            Attempt::Quota(_) | Attempt::Transport(_) => RotationState::Trying(index + 1),
        }
    }
}

/// Run the rotation loop for one query. Pairs are tried strictly in sequence.
pub async fn rotate(
    upstream: &dyn Upstream,
    pool: &CredentialPool,
    base_url: &Url,
    query: &str,
    metrics: &Metrics,
) -> RotationOutcome {
    let mut state = RotationState::Trying(0);

    while let RotationState::Trying(index) = state {
        let Some(pair) = pool.get(index) else {
            return RotationOutcome::TransportExhausted;
        };

        let request = UpstreamRequest::build(base_url, pair, query);
        info!(
            index,
            url = request.redacted(),
            "Attempting search with key index {}",
            index
        );

        let attempt = Attempt::classify(upstream.fetch(&request).await);
        metrics.record_attempt(index, attempt.kind());

        match &attempt {
            Attempt::Success(_) => {}
            Attempt::Quota(body) | Attempt::Semantic(body) => {
                let detail = &body["error"];
                error!(index, error = %detail, "Upstream API error");
            }
            Attempt::Transport(e) => {
                warn!(index, error = %e, "Error fetching from upstream");
            }
        }

        state = state.step(&attempt, pool.len());
    }

    match state {
        RotationState::Finished(outcome) => {
            if matches!(outcome, RotationOutcome::QuotaExhausted) {
                error!("All api keys have reached their daily limit");
            }
            outcome
        }
        RotationState::Trying(_) => RotationOutcome::TransportExhausted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::TransportError;
    use crate::proxy::testing::ScriptedUpstream;
    use serde_json::json;

    fn quota() -> Attempt {
        Attempt::Quota(json!({ "error": { "code": 429 } }))
    }

    fn transport() -> Attempt {
        Attempt::Transport(TransportError::Timeout)
    }

    fn pool(n: usize) -> CredentialPool {
        let keys: Vec<String> = (0..n).map(|i| format!("key{i}")).collect();
        let ids: Vec<String> = (0..n).map(|i| format!("cx{i}")).collect();
        CredentialPool::from_lists(&keys.join(","), &ids.join(",")).unwrap()
    }

    fn base() -> Url {
        Url::parse("http://upstream.test/customsearch/v1").unwrap()
    }

    #[test]
    fn test_step_success_finishes() {
        let body = json!({ "items": [] });
        let next = RotationState::Trying(1).step(&Attempt::Success(body.clone()), 3);
        assert_eq!(next, RotationState::Finished(RotationOutcome::Succeeded(body)));
    }

    #[test]
    fn test_step_quota_advances_until_last() {
        assert_eq!(RotationState::Trying(0).step(&quota(), 2), RotationState::Trying(1));
        assert_eq!(
            RotationState::Trying(1).step(&quota(), 2),
            RotationState::Finished(RotationOutcome::QuotaExhausted)
        );
    }

    #[test]
    fn test_step_transport_advances_until_last() {
        assert_eq!(RotationState::Trying(0).step(&transport(), 2), RotationState::Trying(1));
        assert_eq!(
            RotationState::Trying(1).step(&transport(), 2),
            RotationState::Finished(RotationOutcome::TransportExhausted)
        );
    }

    #[test]
    fn test_step_semantic_error_stops_early() {
        let body = json!({ "error": { "code": 400, "message": "Invalid Argument" } });
        let next = RotationState::Trying(0).step(&Attempt::Semantic(body.clone()), 5);
        assert_eq!(next, RotationState::Finished(RotationOutcome::SemanticError(body)));
    }

    #[test]
    fn test_step_finished_is_sticky() {
        let done = RotationState::Finished(RotationOutcome::QuotaExhausted);
        assert_eq!(done.clone().step(&Attempt::Success(json!({})), 3), done);
    }

    #[tokio::test]
    async fn test_rotate_success_after_quota() {
        let upstream = ScriptedUpstream::new(vec![
            Ok(json!({ "error": { "code": 429, "message": "Quota exceeded" } })),
            Ok(json!({ "error": { "code": 429, "message": "Quota exceeded" } })),
            Ok(json!({ "items": [{ "title": "Rust" }] })),
            Ok(json!({ "items": [] })),
        ]);
        let metrics = Metrics::new();

        let outcome = rotate(&upstream, &pool(4), &base(), "rust", &metrics).await;

        assert_eq!(
            outcome,
            RotationOutcome::Succeeded(json!({ "items": [{ "title": "Rust" }] }))
        );
        assert_eq!(upstream.calls(), 3);
        assert_eq!(metrics.get_credential_stats(0).quota_errors, 1);
        assert_eq!(metrics.get_credential_stats(2).successes, 1);
        assert_eq!(metrics.get_credential_stats(3).attempts, 0);
    }

    #[tokio::test]
    async fn test_rotate_uses_each_pair_in_order() {
        let upstream = ScriptedUpstream::new(vec![
            Ok(json!({ "error": { "code": 429 } })),
            Ok(json!({ "ok": true })),
        ]);

        rotate(&upstream, &pool(2), &base(), "rust", &Metrics::new()).await;

        let urls = upstream.urls();
        assert!(urls[0].contains("key=key0&cx=cx0"));
        assert!(urls[1].contains("key=key1&cx=cx1"));
    }

    #[tokio::test]
    async fn test_rotate_all_quota() {
        let upstream = ScriptedUpstream::new(vec![
            Ok(json!({ "error": { "code": 429 } })),
            Ok(json!({ "error": { "code": 429 } })),
            Ok(json!({ "error": { "code": 429 } })),
        ]);

        let outcome = rotate(&upstream, &pool(3), &base(), "rust", &Metrics::new()).await;

        assert_eq!(outcome, RotationOutcome::QuotaExhausted);
        assert_eq!(upstream.calls(), 3);
    }

    #[tokio::test]
    async fn test_rotate_semantic_error_is_not_retried() {
        let error = json!({ "error": { "code": 400, "message": "Invalid Argument" } });
        let upstream = ScriptedUpstream::new(vec![
            Ok(error.clone()),
            Ok(json!({ "items": [] })),
        ]);

        let outcome = rotate(&upstream, &pool(2), &base(), "rust", &Metrics::new()).await;

        assert_eq!(outcome, RotationOutcome::SemanticError(error));
        assert_eq!(upstream.calls(), 1);
    }

    #[tokio::test]
    async fn test_rotate_all_transport_failures() {
        let upstream = ScriptedUpstream::new(vec![
            Err(TransportError::Timeout),
            Err(TransportError::Timeout),
        ]);

        let outcome = rotate(&upstream, &pool(2), &base(), "rust", &Metrics::new()).await;

        assert_eq!(outcome, RotationOutcome::TransportExhausted);
        assert_eq!(upstream.calls(), 2);
    }

    #[tokio::test]
    async fn test_rotate_quota_then_transport_on_last() {
        let upstream = ScriptedUpstream::new(vec![
            Ok(json!({ "error": { "code": 429 } })),
            Err(TransportError::Timeout),
        ]);

        let outcome = rotate(&upstream, &pool(2), &base(), "rust", &Metrics::new()).await;

        assert_eq!(outcome, RotationOutcome::TransportExhausted);
    }

    #[tokio::test]
    async fn test_rotate_transport_then_success() {
        let upstream = ScriptedUpstream::new(vec![
            Err(TransportError::Timeout),
            Ok(json!({ "items": [] })),
        ]);

        let outcome = rotate(&upstream, &pool(2), &base(), "rust", &Metrics::new()).await;

        assert_eq!(outcome, RotationOutcome::Succeeded(json!({ "items": [] })));
        assert_eq!(upstream.calls(), 2);
    }

    #[tokio::test]
    async fn test_rotate_null_body_moves_to_next_pair() {
        let upstream = ScriptedUpstream::new(vec![
            Ok(Value::Null),
            Ok(json!({ "items": [{ "title": "Rust" }] })),
        ]);
        let metrics = Metrics::new();

        let outcome = rotate(&upstream, &pool(2), &base(), "rust", &metrics).await;

        assert_eq!(
            outcome,
            RotationOutcome::Succeeded(json!({ "items": [{ "title": "Rust" }] }))
        );
        assert_eq!(upstream.calls(), 2);
        assert_eq!(metrics.get_credential_stats(0).transport_errors, 1);
    }
}
