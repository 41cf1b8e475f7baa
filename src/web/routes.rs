//! Route definitions

use super::handlers;
use super::state::AppState;
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Proxy routes
        .route("/api/search", get(handlers::search).post(handlers::search))
        .route("/search", get(handlers::search).post(handlers::search))
        // Operational routes
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::stats))
        // Add middleware
        .layer(ServiceBuilder::new().layer(cors))
        // Add state
        .with_state(state)
}
