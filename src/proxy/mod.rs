//! Search proxy
//!
//! Validates the incoming query, picks the configured profile and turns the
//! upstream outcome into exactly one reply.

mod attempt;
mod rotation;
mod single;
#[cfg(test)]
mod testing;

pub use attempt::{Attempt, QUOTA_ERROR_CODE};
pub use rotation::{rotate, RotationOutcome, RotationState};
pub use single::fetch_once;

use crate::config::{ConfigError, Profile, Settings};
use crate::credentials::{CredentialPool, PoolError};
use crate::error::ProxyError;
use crate::metrics::Metrics;
use crate::network::Upstream;
use axum::{
    http::{header::CACHE_CONTROL, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::error;
use url::Url;

/// The single reply produced for one search request
#[derive(Debug)]
pub enum SearchReply {
    /// 200 with the upstream payload
    Results {
        body: Value,
        cache_control: Option<HeaderValue>,
    },
    /// 400 forwarding an upstream error payload
    UpstreamError(Value),
    Error(ProxyError),
}

impl From<ProxyError> for SearchReply {
    fn from(err: ProxyError) -> Self {
        SearchReply::Error(err)
    }
}

impl IntoResponse for SearchReply {
    fn into_response(self) -> Response {
        match self {
            SearchReply::Results {
                body,
                cache_control,
            } => {
                let mut response = (StatusCode::OK, Json(body)).into_response();
                if let Some(value) = cache_control {
                    response.headers_mut().insert(CACHE_CONTROL, value);
                }
                response
            }
            SearchReply::UpstreamError(body) => {
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            SearchReply::Error(err) => err.into_response(),
        }
    }
}

/// Search proxy bound to one immutable configuration
pub struct Proxy {
    upstream: Arc<dyn Upstream>,
    pool: Result<CredentialPool, PoolError>,
    profile: Profile,
    base_url: Url,
    cache_control: HeaderValue,
    metrics: Arc<Metrics>,
}

impl Proxy {
    /// Build a proxy from validated settings.
    ///
    /// A bad credential configuration does not fail construction; it is
    /// reported here once and then on every search.
    pub fn new(
        settings: &Settings,
        upstream: Arc<dyn Upstream>,
        metrics: Arc<Metrics>,
    ) -> Result<Self, ConfigError> {
        let pool = settings.credential_pool();
        if let Err(ref e) = pool {
            error!(
                "Api credentials not found or mismatched ({}). Ensure GOOGLE_API_KEYS and \
                 GOOGLE_SEARCH_ENGINE_IDS have the same number of comma-separated values.",
                e
            );
        }

        Ok(Self {
            upstream,
            pool,
            profile: settings.credentials.profile,
            base_url: settings.upstream.url()?,
            cache_control: settings.upstream.cache_control_header()?,
            metrics,
        })
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Number of usable credential pairs, zero when misconfigured
    pub fn pool_size(&self) -> usize {
        self.pool.as_ref().map(CredentialPool::len).unwrap_or(0)
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Handle one search for the raw `q` parameter
    pub async fn search(&self, query: Option<&str>) -> SearchReply {
        let query = match query {
            Some(q) if !q.is_empty() => q,
            _ => return ProxyError::MissingQuery.into(),
        };

        let pool = match &self.pool {
            Ok(pool) => pool,
            Err(e) => {
                error!(error = %e, "Api credentials are not configured");
                return ProxyError::CredentialsNotConfigured.into();
            }
        };

        self.metrics.inc_search();

        match self.profile {
            Profile::Rotating => self.search_rotating(pool, query).await,
            Profile::Single => self.search_single(pool, query).await,
        }
    }

    async fn search_rotating(&self, pool: &CredentialPool, query: &str) -> SearchReply {
        let outcome = rotate(
            self.upstream.as_ref(),
            pool,
            &self.base_url,
            query,
            &self.metrics,
        )
        .await;

        match outcome {
            RotationOutcome::Succeeded(body) => SearchReply::Results {
                body,
                cache_control: Some(self.cache_control.clone()),
            },
            RotationOutcome::SemanticError(body) => SearchReply::UpstreamError(body),
            RotationOutcome::QuotaExhausted => ProxyError::QuotaExhausted.into(),
            RotationOutcome::TransportExhausted => ProxyError::AllSourcesFailed.into(),
        }
    }

    async fn search_single(&self, pool: &CredentialPool, query: &str) -> SearchReply {
        let Some(pair) = pool.first() else {
            return ProxyError::CredentialsNotConfigured.into();
        };

        match fetch_once(self.upstream.as_ref(), pair, &self.base_url, query, &self.metrics).await
        {
            Some(body) => SearchReply::Results {
                body,
                cache_control: None,
            },
            None => ProxyError::FetchFailed.into(),
        }
    }
}
