//! Utility functions for key derivation, URL handling and time.
//!
//! - [`key_generator`] - HMAC-SHA256 short key derivation and base-62 codec
//! - [`url_normalizer`] - URL validation and scheme normalization
//! - [`clock`] - Injectable time source

pub mod clock;
pub mod key_generator;
pub mod url_normalizer;
