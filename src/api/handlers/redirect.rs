//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::application::services::{RedirectTarget, ShortenerError};
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short key to its original URL.
///
/// # Endpoint
///
/// `GET /{short_key}`
///
/// # Response Codes
///
/// - **301 Moved Permanently**: `Location` carries the original URL
/// - **404 Not Found**: `{"detail": "URL not found"}` or `{"detail": "URL expired"}`
///
/// An expired mapping is removed on the request that observes it, so later
/// requests for the same key get "URL not found".
pub async fn redirect_handler(
    Path(short_key): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    match state.shortener.resolve(&short_key).await? {
        RedirectTarget::Found { target } => {
            Ok((StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, target)]))
        }
        RedirectTarget::Expired => Err(ShortenerError::Expired.into()),
        RedirectTarget::NotFound => Err(ShortenerError::NotFound.into()),
    }
}
