//! Hit counter stores.
//!
//! - [`RedisCounterStore`] - Redis `INCR` counters with native TTL
//! - [`MemoryCounterStore`] - In-process fallback when Redis is not configured

mod memory_counter_store;
mod redis_counter_store;

pub use memory_counter_store::MemoryCounterStore;
pub use redis_counter_store::RedisCounterStore;
