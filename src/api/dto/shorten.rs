//! DTOs for the shortening endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Longest accepted expiry: ten years, in seconds.
pub const MAX_EXPIRY_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL; scheme and host are checked by the service.
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub url: String,

    /// Lifetime in seconds. Absent or `0` means the link never expires.
    #[validate(range(max = MAX_EXPIRY_SECONDS, message = "Expiry must not exceed 10 years"))]
    pub expiry: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short_url: String,
}
