//! HTTP request handlers

use super::state::AppState;
use axum::{
    extract::{RawQuery, State},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// First `q` value of a raw query string, decoded
fn query_param(raw: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(raw?.as_bytes())
        .find(|(key, _)| key == "q")
        .map(|(_, value)| value.into_owned())
}

/// Search handler
pub async fn search(State(state): State<AppState>, RawQuery(raw): RawQuery) -> Response {
    let query = query_param(raw.as_deref());
    let span = info_span!("search", request_id = %Uuid::new_v4());

    state
        .proxy
        .search(query.as_deref())
        .instrument(span)
        .await
        .into_response()
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "profile": state.settings.credentials.profile,
        "credentials": state.proxy.pool_size(),
    }))
}

/// Stats handler
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.proxy.metrics().snapshot())
}
