//! Outbound search request construction

use crate::credentials::CredentialPair;
use std::fmt;
use url::Url;

/// A fully built upstream search request for one credential pair
#[derive(Clone)]
pub struct UpstreamRequest {
    url: String,
    redacted: String,
}

impl UpstreamRequest {
    /// Build `<base>?key=<key>&cx=<cx>&q=<query>`.
    ///
    /// Values are percent-encoded once. Only RFC 3986 unreserved characters
    /// are left as-is, space becomes `%20`.
    pub fn build(base: &Url, pair: &CredentialPair, query: &str) -> Self {
        let base = base.as_str();
        let sep = if base.contains('?') { '&' } else { '?' };
        let cx = urlencoding::encode(&pair.search_engine_id);
        let q = urlencoding::encode(query);

        let url = format!(
            "{base}{sep}key={}&cx={cx}&q={q}",
            urlencoding::encode(pair.api_key.expose())
        );
        let redacted = format!("{base}{sep}cx={cx}&q={q}");

        Self { url, redacted }
    }

    /// Full URL, including the api key
    pub fn url(&self) -> &str {
        &self.url
    }

    /// URL with the key parameter removed, safe to log
    pub fn redacted(&self) -> &str {
        &self.redacted
    }
}

impl fmt::Debug for UpstreamRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamRequest")
            .field("url", &self.redacted)
            .finish()
    }
}
