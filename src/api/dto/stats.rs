//! DTOs for the hit statistics endpoint.

use serde::{Deserialize, Serialize};

/// Hit count for a single short key.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub short_key: String,
    pub hits: i64,
}
