//! Handler for link shortening endpoint.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short URL for a long URL.
///
/// # Endpoint
///
/// `POST /shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com",
///   "expiry": 3600  // optional, seconds
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "short_url": "http://localhost:8700/0ALdg8GD"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the body fails validation or the URL has no
/// http(s) scheme or host.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    payload.validate()?;

    let short_key = state
        .shortener
        .shorten(&payload.url, payload.expiry)
        .await?;

    Ok(Json(ShortenResponse {
        short_url: state.short_url(&short_key),
    }))
}
