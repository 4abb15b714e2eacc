//! Route definitions

use super::handlers;
use super::state::AppState;
use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // API routes
        .route("/api/v1/searcher", get(handlers::list_searchers))
        .route("/api/v1/searcher/:searcher_name/query", get(handlers::query))
        // Service routes
        .route("/stats", get(handlers::stats))
        .route("/health", get(handlers::health))
        // Add middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // Add state
        .with_state(state)
}
