//! Store trait definitions for the domain layer.
//!
//! The service sees two independently owned projections of one short key:
//!
//! - [`MappingStore`] - durable, authoritative for existence and expiry
//! - [`CounterStore`] - ephemeral, authoritative for hit counts
//!
//! They never share a transaction. Implementations live in
//! `crate::infrastructure`; mock implementations are generated via `mockall`
//! for unit tests.

pub mod counter_store;
pub mod error;
pub mod mapping_store;

pub use counter_store::CounterStore;
pub use error::{StorageError, StorageResult, with_deadline};
pub use mapping_store::MappingStore;

#[cfg(test)]
pub use counter_store::MockCounterStore;
#[cfg(test)]
pub use mapping_store::MockMappingStore;
