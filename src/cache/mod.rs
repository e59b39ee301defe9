//! Cache Module
//!
//! Sharded in-memory cache with per-shard LRU ordering and size accounting.

mod entry;
mod lru;
mod partition;
mod shard;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{entry_size, CacheEntry};
pub use lru::{NodeId, RecencyList};
pub use partition::{fnv1a_hash, polynomial_hash, HashStrategy, Partitioner};
pub use shard::Shard;
pub use stats::{CacheStats, StatsCounters};
pub use store::ShardedCache;

// == Public Constants ==
/// Default number of shards
pub const DEFAULT_NUM_SHARDS: usize = 32;

/// Maximum allowed key length in bytes
pub const MAX_KEY_SIZE: usize = 256;

/// Maximum allowed value length in bytes
pub const MAX_VALUE_SIZE: usize = 256;

/// Fixed per-entry bookkeeping estimate added to key and value lengths
pub const ENTRY_OVERHEAD: usize = 64;
