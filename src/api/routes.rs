//! API route configuration.

use crate::api::handlers::{health_handler, redirect_handler, shorten_handler, stats_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All public routes.
///
/// # Endpoints
///
/// - `POST /shorten`            - Create a short URL
/// - `GET  /stats/{short_key}`  - Hit count for a short key
/// - `GET  /health`             - Store reachability
/// - `GET  /{short_key}`        - 301 redirect to the original URL
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/stats/{short_key}", get(stats_handler))
        .route("/health", get(health_handler))
        .route("/{short_key}", get(redirect_handler))
}
