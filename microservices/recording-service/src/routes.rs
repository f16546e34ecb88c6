//! Router configuration for Recording Service API

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::AppState;

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health & Metrics
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .route("/stats", get(handlers::stats))
        // User lookup
        .route("/api/v1/users", get(handlers::find_user))
        // Recording
        .route("/api/v1/recording/{number}", get(handlers::recording_status))
        .route("/api/v1/recording/{number}/enable", post(handlers::enable_recording))
        .route("/api/v1/recording/{number}/disable", post(handlers::disable_recording))
        .with_state(state)
}
