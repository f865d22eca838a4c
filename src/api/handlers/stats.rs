//! Handler for per-key hit statistics.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::stats::StatsResponse;
use crate::application::services::ShortenerError;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the hit count for a short key.
///
/// # Endpoint
///
/// `GET /stats/{short_key}`
///
/// # Response
///
/// ```json
/// {
///   "short_key": "0ALdg8GD",
///   "hits": 3
/// }
/// ```
///
/// A key whose mapping exists but whose counter has lapsed reports 0 hits.
///
/// # Errors
///
/// Returns 404 `{"detail": "Stats not found"}` if the key is unknown.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(short_key): Path<String>,
) -> Result<Json<StatsResponse>, AppError> {
    let hits = state
        .shortener
        .stats(&short_key)
        .await
        .map_err(|e| match e {
            ShortenerError::NotFound => AppError::not_found("Stats not found"),
            other => other.into(),
        })?;

    Ok(Json(StatsResponse { short_key, hits }))
}
