//! Settings structures for CSE-Proxy configuration

use super::ConfigError;
use crate::credentials::{CredentialPool, PoolError};
use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Google Custom Search JSON API endpoint
pub const DEFAULT_UPSTREAM_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Edge caching directive attached to successful rotating-profile responses
pub const DEFAULT_CACHE_CONTROL: &str = "s-maxage=600, stale-while-revalidate";

/// Main settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub upstream: UpstreamSettings,
    pub credentials: CredentialSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with process environment variables
    pub fn merge_env(&mut self) {
        self.merge_from(|name| std::env::var(name).ok());
    }

    /// Merge with variables from an arbitrary lookup
    pub fn merge_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("CSE_PROXY_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Some(val) = lookup("CSE_PROXY_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = lookup("CSE_PROXY_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Some(val) = lookup("CSE_PROXY_UPSTREAM_URL") {
            self.upstream.base_url = val;
        }
        if let Some(val) = lookup("CSE_PROXY_TIMEOUT") {
            if let Ok(secs) = val.parse() {
                self.upstream.request_timeout = secs;
            }
        }

        let keys = lookup("GOOGLE_API_KEYS");
        let ids = lookup("GOOGLE_SEARCH_ENGINE_IDS");
        let lists_unset = keys.is_none() && ids.is_none();

        if let Some(val) = keys {
            self.credentials.api_keys = val;
        }
        if let Some(val) = ids {
            self.credentials.search_engine_ids = val;
        }

        // Single-key deployments predate the comma lists
        if lists_unset && !self.credentials.is_configured() {
            if let Some(key) = lookup("GOOGLE_API_KEY") {
                self.credentials.api_keys = key;
                self.credentials.search_engine_ids =
                    lookup("GOOGLE_SEARCH_ENGINE_ID").unwrap_or_default();
                self.credentials.profile = Profile::Single;
            }
        }

        if let Some(val) = lookup("CSE_PROXY_PROFILE") {
            match val.parse() {
                Ok(profile) => self.credentials.profile = profile,
                Err(e) => tracing::warn!("Ignoring CSE_PROXY_PROFILE: {}", e),
            }
        }
    }

    /// Check the settings that must be valid before the server starts.
    ///
    /// Credential problems are reported per request, not here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.upstream.url()?;
        self.upstream.timeout()?;
        self.upstream.cache_control_header()?;
        Ok(())
    }

    /// Build the credential pool from the configured lists
    pub fn credential_pool(&self) -> Result<CredentialPool, PoolError> {
        CredentialPool::from_lists(
            &self.credentials.api_keys,
            &self.credentials.search_engine_ids,
        )
    }
}

/// General settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 3000,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamSettings {
    /// Search API endpoint
    pub base_url: String,
    /// Timeout for a single upstream attempt, in seconds
    pub request_timeout: f64,
    /// Cache-Control value for successful responses
    pub cache_control: String,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_URL.to_string(),
            request_timeout: 10.0,
            cache_control: DEFAULT_CACHE_CONTROL.to_string(),
        }
    }
}

impl UpstreamSettings {
    /// Parsed endpoint; must be absolute http(s)
    pub fn url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidUrl(self.base_url.clone(), e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::InvalidUrl(
                self.base_url.clone(),
                format!("unsupported scheme {other}"),
            )),
        }
    }

    /// Per-attempt timeout; must be positive and fit in a `Duration`
    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        let invalid = || ConfigError::InvalidTimeout(self.request_timeout);
        if self.request_timeout.is_nan() || self.request_timeout <= 0.0 {
            return Err(invalid());
        }
        Duration::try_from_secs_f64(self.request_timeout).map_err(|_| invalid())
    }

    pub fn cache_control_header(&self) -> Result<HeaderValue, ConfigError> {
        HeaderValue::from_str(&self.cache_control)
            .map_err(|_| ConfigError::InvalidCacheControl(self.cache_control.clone()))
    }
}

/// Which proxy behavior to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Rotate through every configured pair
    #[default]
    Rotating,
    /// Legacy single-key behavior: one attempt, no error passthrough
    Single,
}

impl std::str::FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rotating" => Ok(Profile::Rotating),
            "single" => Ok(Profile::Single),
            other => Err(format!("unknown profile '{other}'")),
        }
    }
}

/// Credential settings
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSettings {
    pub profile: Profile,
    /// Comma-separated API keys
    #[serde(skip_serializing)]
    pub api_keys: String,
    /// Comma-separated search engine ids, paired with `api_keys` by position
    pub search_engine_ids: String,
}

impl std::fmt::Debug for CredentialSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSettings")
            .field("profile", &self.profile)
            .field("api_keys", &"****")
            .field("search_engine_ids", &self.search_engine_ids)
            .finish()
    }
}

impl CredentialSettings {
    fn is_configured(&self) -> bool {
        !self.api_keys.trim().is_empty() || !self.search_engine_ids.trim().is_empty()
    }
}
