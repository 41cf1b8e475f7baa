//! Upstream credentials
//!
//! A credential pair is one Google API key plus the Programmable Search Engine
//! id (`cx`) it is used with. The pool is the ordered list of pairs tried by the
//! rotating proxy.

use std::fmt;
use thiserror::Error;

/// Errors raised while assembling a credential pool
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("no api keys or search engine ids configured")]
    Empty,
    #[error("{keys} api keys but {ids} search engine ids configured")]
    Mismatched { keys: usize, ids: usize },
}

/// A secret API key. Never rendered in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Raw key value, only for building the outbound request
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

/// One (api key, search engine id) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub api_key: ApiKey,
    pub search_engine_id: String,
}

impl CredentialPair {
    pub fn new(api_key: impl Into<String>, search_engine_id: impl Into<String>) -> Self {
        Self {
            api_key: ApiKey::new(api_key),
            search_engine_id: search_engine_id.into(),
        }
    }
}

/// Ordered pool of credential pairs, in rotation order
#[derive(Debug, Clone)]
pub struct CredentialPool {
    pairs: Vec<CredentialPair>,
}

impl CredentialPool {
    /// Build a pool from two comma-separated lists, paired by position.
    ///
    /// Entries are trimmed and blanks dropped before pairing, so `"a, ,b"`
    /// yields two keys.
    pub fn from_lists(api_keys: &str, search_engine_ids: &str) -> Result<Self, PoolError> {
        let keys = split_list(api_keys);
        let ids = split_list(search_engine_ids);

        if keys.is_empty() || ids.is_empty() {
            return Err(PoolError::Empty);
        }
        if keys.len() != ids.len() {
            return Err(PoolError::Mismatched {
                keys: keys.len(),
                ids: ids.len(),
            });
        }

        let pairs = keys
            .into_iter()
            .zip(ids)
            .map(|(key, id)| CredentialPair::new(key, id))
            .collect();

        Ok(Self { pairs })
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CredentialPair> {
        self.pairs.get(index)
    }

    pub fn first(&self) -> Option<&CredentialPair> {
        self.pairs.first()
    }
}

fn split_list(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_by_position() {
        let pool = CredentialPool::from_lists("k1, k2,k3", "c1,c2 , c3").unwrap();
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get(1).unwrap().api_key.expose(), "k2");
        assert_eq!(pool.get(1).unwrap().search_engine_id, "c2");
        assert_eq!(pool.get(2).unwrap().search_engine_id, "c3");
    }

    #[test]
    fn test_blank_entries_dropped() {
        let pool = CredentialPool::from_lists("k1,,k2,", " c1 , c2").unwrap();
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_empty_lists() {
        assert_eq!(CredentialPool::from_lists("", "").unwrap_err(), PoolError::Empty);
        assert_eq!(CredentialPool::from_lists("k1", " , ").unwrap_err(), PoolError::Empty);
        assert_eq!(CredentialPool::from_lists("", "c1").unwrap_err(), PoolError::Empty);
    }

    #[test]
    fn test_mismatched_lengths() {
        let err = CredentialPool::from_lists("k1,k2", "c1").unwrap_err();
        assert_eq!(err, PoolError::Mismatched { keys: 2, ids: 1 });
    }

    #[test]
    fn test_key_redacted() {
        let pair = CredentialPair::new("super-secret", "cx-1");
        let rendered = format!("{:?} {}", pair, pair.api_key);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("cx-1"));
    }
}
