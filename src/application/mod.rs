//! Application layer services implementing business logic.
//!
//! Services consume the store traits from [`crate::domain::repositories`] and
//! provide a narrow API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::shortener_service::ShortenerService`] - Short key creation,
//!   redirect resolution with lazy expiry, and hit statistics

pub mod services;
