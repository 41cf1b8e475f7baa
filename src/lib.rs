//! CSE-Proxy: a credential-rotating proxy for the Google Custom Search JSON API
//!
//! Keeps API keys on the server and rotates through several key/engine-id
//! pairs so that one exhausted daily quota does not take search down.

pub mod config;
pub mod credentials;
pub mod error;
pub mod metrics;
pub mod network;
pub mod proxy;
pub mod web;

pub use config::Settings;
pub use credentials::{CredentialPair, CredentialPool};
pub use error::ProxyError;
pub use proxy::{Proxy, SearchReply};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
