//! Route definitions for the Hibi HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState`
//! and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(reminder_routes())
        .merge(device_routes())
        .merge(broadcast_routes())
        .merge(health_routes());

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Reminder settings endpoints
fn reminder_routes() -> Router<AppState> {
    Router::new()
        .route("/reminders", put(handlers::reminder::set_reminder))
        .route("/reminders", get(handlers::reminder::get_reminder))
        .route(
            "/reminders/read",
            post(handlers::reminder::mark_reminder_read),
        )
}

/// Topic broadcast endpoint
fn broadcast_routes() -> Router<AppState> {
    Router::new().route("/broadcasts", post(handlers::broadcast::send_broadcast))
}

/// Device registration endpoints
fn device_routes() -> Router<AppState> {
    Router::new()
        .route("/devices", post(handlers::device::register_device))
        .route("/devices", get(handlers::device::list_devices))
        .route(
            "/devices/{device_id}",
            delete(handlers::device::revoke_device),
        )
}

/// Health check endpoints (no auth required)
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}

/// Build CORS layer from configuration
fn build_cors_layer(state: &AppState) -> CorsLayer {
    use tower_http::cors::Any;

    let origins = &state.config.server.cors_origins;

    if origins.contains(&"*".to_string()) {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let parsed: Vec<http::HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods(Any)
        .allow_headers(Any)
}
