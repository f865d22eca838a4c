use std::sync::Arc;

use crate::application::services::DynShortenerService;

#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<DynShortenerService>,
    /// Public origin prepended to short keys, without a trailing slash.
    pub base_url: String,
}

impl AppState {
    pub fn new(shortener: Arc<DynShortenerService>, base_url: &str) -> Self {
        Self {
            shortener,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn short_url(&self, short_key: &str) -> String {
        format!("{}/{}", self.base_url, short_key)
    }
}
