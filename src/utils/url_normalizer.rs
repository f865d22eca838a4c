//! URL validation and scheme normalization.

use std::borrow::Cow;
use url::Url;

/// Reasons a submitted URL is rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL has no host")]
    MissingHost,
}

/// Checks that `input` is an absolute HTTP(S) URL with a non-empty host.
///
/// The URL is not rewritten: the stored mapping keeps exactly what the client sent,
/// so the redirect `Location` matches the submitted URL byte for byte.
///
/// # Errors
///
/// - [`UrlValidationError::InvalidFormat`] when the input does not parse
///   (e.g. `"not a url"`, `"example.com"`, `"http://"`)
/// - [`UrlValidationError::UnsupportedProtocol`] for other schemes
/// - [`UrlValidationError::MissingHost`] when the parsed URL has an empty host
pub fn validate_url(input: &str) -> Result<(), UrlValidationError> {
    let url = Url::parse(input).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(UrlValidationError::MissingHost),
    }
}

/// Prefixes `http://` unless the URL already starts with `http://` or `https://`.
pub fn ensure_scheme(url: &str) -> Cow<'_, str> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Cow::Borrowed(url)
    } else {
        Cow::Owned(format!("http://{url}"))
    }
}
