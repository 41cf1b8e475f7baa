//! Classification of a single upstream attempt

use crate::metrics::AttemptKind;
use crate::network::TransportError;
use serde_json::Value;

/// Error code the search API uses for exhausted daily quota
pub const QUOTA_ERROR_CODE: f64 = 429.0;

/// What one upstream call produced
#[derive(Debug)]
pub enum Attempt {
    /// JSON body without an error field
    Success(Value),
    /// Error body whose code marks a quota or rate limit
    Quota(Value),
    /// Any other error body
    Semantic(Value),
    /// No usable JSON body could be obtained
    Transport(TransportError),
}

impl Attempt {
    pub fn classify(result: Result<Value, TransportError>) -> Self {
        let body = match result {
            Ok(Value::Null) => return Attempt::Transport(TransportError::NullBody),
            Ok(body) => body,
            Err(e) => return Attempt::Transport(e),
        };

        let Some(error) = body.get("error").filter(|e| is_set(e)) else {
            return Attempt::Success(body);
        };

        let is_quota = error
            .get("code")
            .and_then(Value::as_f64)
            .is_some_and(|code| code == QUOTA_ERROR_CODE);

        if is_quota {
            Attempt::Quota(body)
        } else {
            Attempt::Semantic(body)
        }
    }

    pub fn kind(&self) -> AttemptKind {
        match self {
            Attempt::Success(_) => AttemptKind::Success,
            Attempt::Quota(_) => AttemptKind::Quota,
            Attempt::Semantic(_) => AttemptKind::Semantic,
            Attempt::Transport(_) => AttemptKind::Transport,
        }
    }
}

/// `null`, `false`, `0` and `""` do not count as an error field
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
