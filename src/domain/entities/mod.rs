//! Core domain entities.
//!
//! - [`UrlMapping`] - The durable short key to URL record
//!
//! Hit counts have no entity of their own: a counter is a bare integer keyed by
//! the same short key in [`crate::domain::repositories::CounterStore`].

pub mod url_mapping;

pub use url_mapping::UrlMapping;
