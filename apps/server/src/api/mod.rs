//! API layer - routes, handlers, and middleware

pub mod handlers;
pub mod middleware;
pub mod routes;

use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

/// Maximum accepted request body; registration payloads are small.
const MAX_BODY_SIZE: usize = 512 * 1024;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let cors_origins = state.config.server.cors_origins.clone();

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Favicon handler (returns 204 to prevent 404 logs)
        .route("/favicon.ico", get(favicon))
        // Metrics endpoint
        .route("/metrics", get(handlers::metrics::metrics))
        // Directory API
        .nest("/api", routes::api_routes())
        .with_state(state)
        // Middleware (applied in reverse order)
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::metrics_middleware))
        .layer(middleware::cors(&cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "place-server"
    }))
}

async fn favicon() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}
