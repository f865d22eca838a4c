//! Mapping store implementations.
//!
//! - [`PgMappingStore`] - PostgreSQL, the durable production store
//! - [`MemoryMappingStore`] - `DashMap`-backed, for tests and embedding

pub mod memory_mapping_store;
pub mod pg_mapping_store;

pub use memory_mapping_store::MemoryMappingStore;
pub use pg_mapping_store::{MappingSummary, PgMappingStore};
