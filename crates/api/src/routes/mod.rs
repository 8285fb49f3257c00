//! API routes.

pub mod admin;
pub mod callback;
pub mod digest;
pub mod health;
pub mod ws;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/internal/pipeline/callback", post(callback::callback_handler))
        .route("/digest/:kind", get(digest::digest_handler))
        .route("/admin/cache/invalidate", post(admin::invalidate_handler))
        .route("/admin/cache/stats", get(admin::cache_stats_handler))
        .route("/admin/sessions", get(admin::sessions_handler))
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
