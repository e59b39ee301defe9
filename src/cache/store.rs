//! Sharded Cache Module
//!
//! Main cache engine: a fixed array of independently locked shards plus a
//! global size counter kept in step by per-mutation deltas.

use std::sync::atomic::{AtomicI64, Ordering};

use tracing::debug;

use crate::cache::{
    CacheStats, HashStrategy, Partitioner, Shard, StatsCounters, DEFAULT_NUM_SHARDS,
    MAX_KEY_SIZE, MAX_VALUE_SIZE,
};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Sharded Cache ==
/// Sharded LRU cache with aggregate size accounting.
///
/// LRU order is exact within a shard only. The shard count is fixed at
/// construction.
#[derive(Debug)]
pub struct ShardedCache {
    /// Fixed set of shards
    shards: Box<[Shard]>,
    /// Key → shard mapping
    partitioner: Partitioner,
    /// Sum of every shard's accounted size
    total_size: AtomicI64,
    /// Hit/miss/eviction counters
    counters: StatsCounters,
    /// Maximum key length in bytes
    max_key_size: usize,
    /// Maximum value length in bytes
    max_value_size: usize,
}

impl Default for ShardedCache {
    fn default() -> Self {
        Self::new(DEFAULT_NUM_SHARDS)
    }
}

impl ShardedCache {
    // == Constructor ==
    /// Creates a cache with `num_shards` shards and default size limits.
    pub fn new(num_shards: usize) -> Self {
        Self::with_limits(num_shards, MAX_KEY_SIZE, MAX_VALUE_SIZE)
    }

    /// Creates a cache with explicit key and value length limits.
    pub fn with_limits(num_shards: usize, max_key_size: usize, max_value_size: usize) -> Self {
        Self::with_partitioner(Partitioner::new(num_shards), max_key_size, max_value_size)
    }

    /// Creates a cache using a specific partitioner. The shard count is taken
    /// from the partitioner.
    pub fn with_partitioner(
        partitioner: Partitioner,
        max_key_size: usize,
        max_value_size: usize,
    ) -> Self {
        let shards: Vec<Shard> = (0..partitioner.shard_count())
            .map(|_| Shard::new())
            .collect();
        Self {
            shards: shards.into_boxed_slice(),
            partitioner,
            total_size: AtomicI64::new(0),
            counters: StatsCounters::new(),
            max_key_size,
            max_value_size,
        }
    }

    /// Creates a cache from server configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::with_partitioner(
            Partitioner::with_strategy(config.num_shards, HashStrategy::Fnv1a),
            config.max_key_size,
            config.max_value_size,
        )
    }

    fn shard_for(&self, key: &str) -> &Shard {
        &self.shards[self.partitioner.shard_index(key)]
    }

    // == Put ==
    /// Stores a key-value pair, overwriting any previous value.
    ///
    /// # Errors
    /// `CacheError::Validation` if the key or value is longer than the
    /// configured limit (in bytes); `CacheError::Internal` if the owning
    /// shard is inconsistent.
    pub fn put(&self, key: String, value: String) -> Result<()> {
        if key.len() > self.max_key_size {
            return Err(CacheError::Validation(format!(
                "Key exceeds maximum length of {} bytes",
                self.max_key_size
            )));
        }
        if value.len() > self.max_value_size {
            return Err(CacheError::Validation(format!(
                "Value exceeds maximum length of {} bytes",
                self.max_value_size
            )));
        }

        let delta = self.shard_for(&key).put(key, value)?;
        self.total_size.fetch_add(delta, Ordering::AcqRel);
        Ok(())
    }

    // == Get ==
    /// Retrieves a value and promotes it within its shard.
    ///
    /// # Errors
    /// `CacheError::Internal` if the owning shard is inconsistent.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.shard_for(key).get(key)?;
        match value {
            Some(_) => self.counters.record_hit(),
            None => self.counters.record_miss(),
        }
        Ok(value)
    }

    // == Delete ==
    /// Removes an entry by key.
    ///
    /// # Errors
    /// `CacheError::NotFound` if the key is absent.
    pub fn delete(&self, key: &str) -> Result<()> {
        match self.shard_for(key).remove(key)? {
            Some(freed) => {
                self.total_size.fetch_sub(freed as i64, Ordering::AcqRel);
                Ok(())
            }
            None => Err(CacheError::NotFound(key.to_string())),
        }
    }

    // == Evict Batch ==
    /// Evicts roughly `target_count` least recently used entries, spread over
    /// all shards.
    ///
    /// Every shard gets a quota of `max(1, target_count / shard_count)`.
    /// Empty shards are skipped; freeing fewer entries than requested is a
    /// normal outcome.
    ///
    /// # Returns
    /// Total bytes freed.
    pub fn evict_batch(&self, target_count: usize) -> u64 {
        let per_shard = (target_count / self.shards.len()).max(1);
        let mut total_freed = 0u64;
        let mut total_evicted = 0usize;

        for shard in self.shards.iter() {
            let (evicted, freed) = shard.evict_up_to(per_shard);
            if evicted > 0 {
                self.total_size.fetch_sub(freed as i64, Ordering::AcqRel);
                total_evicted += evicted;
                total_freed += freed;
            }
        }

        self.counters.record_evictions(total_evicted as u64);
        debug!(
            "Batch eviction: target={}, evicted={}, freed={} bytes",
            target_count, total_evicted, total_freed
        );
        total_freed
    }

    // == Accessors ==
    /// Returns the aggregate accounted size in bytes.
    pub fn total_size(&self) -> u64 {
        self.total_size.load(Ordering::Acquire).max(0) as u64
    }

    /// Returns the current number of entries across all shards.
    pub fn len(&self) -> usize {
        self.shards.iter().map(Shard::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(Shard::is_empty)
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Index of the shard owning `key`.
    pub fn shard_index(&self, key: &str) -> usize {
        self.partitioner.shard_index(key)
    }

    /// Per-shard accounted sizes, in shard order.
    pub fn shard_sizes(&self) -> Vec<u64> {
        self.shards.iter().map(Shard::current_size).collect()
    }

    /// Per-shard entry counts, in shard order.
    pub fn shard_lens(&self) -> Vec<usize> {
        self.shards.iter().map(Shard::len).collect()
    }

    #[cfg(test)]
    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.shard_for(key).contains_key(key)
    }

    #[cfg(test)]
    pub(crate) fn detach_recency_node(&self, key: &str) {
        self.shard_for(key).detach_recency_node(key);
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits(),
            misses: self.counters.misses(),
            evictions: self.counters.evictions(),
            total_entries: self.len(),
            total_bytes: self.total_size(),
            shard_count: self.shard_count(),
            hash_strategy: self.partitioner.strategy(),
        }
    }
}
