//! REST API layer for HTTP request/response handling.
//!
//! This layer translates HTTP requests into [`ShortenerService`] calls and
//! formats responses according to the API contract.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Request tracing
//! - [`routes`] - Route configuration
//!
//! [`ShortenerService`]: crate::application::services::ShortenerService

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
