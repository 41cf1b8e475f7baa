//! Client-visible proxy errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors reported to the caller as `{"error": message}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProxyError {
    #[error("a search query \"q\" is required.")]
    MissingQuery,
    #[error("api credentials are not configured on the server.")]
    CredentialsNotConfigured,
    #[error("daily search limit reached for all keys.")]
    QuotaExhausted,
    #[error("failed to fetch search results from all available sources.")]
    AllSourcesFailed,
    /// Single-key profile failure of any kind
    #[error("failed to fetch search results.")]
    FetchFailed,
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingQuery => StatusCode::BAD_REQUEST,
            ProxyError::QuotaExhausted => StatusCode::TOO_MANY_REQUESTS,
            ProxyError::CredentialsNotConfigured
            | ProxyError::AllSourcesFailed
            | ProxyError::FetchFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ProxyError::MissingQuery.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ProxyError::QuotaExhausted.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            ProxyError::CredentialsNotConfigured.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ProxyError::FetchFailed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_error_body() {
        let response = ProxyError::MissingQuery.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({ "error": "a search query \"q\" is required." }));
    }
}
