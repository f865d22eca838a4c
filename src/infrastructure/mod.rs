//! Infrastructure layer for external integrations.
//!
//! Concrete implementations of the store traits defined in
//! [`crate::domain::repositories`].
//!
//! # Modules
//!
//! - [`cache`] - Hit counter stores (Redis and in-memory)
//! - [`persistence`] - Mapping stores (PostgreSQL and in-memory)

pub mod cache;
pub mod persistence;
