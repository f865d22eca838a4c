//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /shorten`            - Create a short URL
//! - `GET  /{short_key}`        - Redirect (301)
//! - `GET  /stats/{short_key}`  - Hit count
//! - `GET  /health`             - Store checks
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling, so `/shorten/` and
//!   `/{short_key}/` route like their bare forms

use crate::api;
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Routes with state and tracing applied, without path normalization.
pub fn router(state: AppState) -> Router {
    api::routes::public_routes()
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application service served by [`crate::server::run`].
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}
