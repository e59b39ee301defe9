//! Partitioner Module
//!
//! Maps keys to shard indices. The mapping is fixed for the lifetime of the
//! process; there is no resharding.

use serde::Serialize;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

// == Hash Strategy ==
/// Hash function used to spread keys over shards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HashStrategy {
    /// Rolling `hash * 31 + byte`, absolute value.
    Polynomial,
    /// 64-bit FNV-1a. Spreads correlated keys (`user:1`, `user:2`, ...) better.
    #[default]
    Fnv1a,
}

// == Partitioner ==
/// Deterministic key → shard index mapping.
#[derive(Debug, Clone, Copy)]
pub struct Partitioner {
    shard_count: usize,
    strategy: HashStrategy,
}

impl Partitioner {
    /// Creates a partitioner over `shard_count` shards using FNV-1a.
    ///
    /// A shard count of zero is raised to one.
    pub fn new(shard_count: usize) -> Self {
        Self::with_strategy(shard_count, HashStrategy::default())
    }

    pub fn with_strategy(shard_count: usize, strategy: HashStrategy) -> Self {
        Self {
            shard_count: shard_count.max(1),
            strategy,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shard_count
    }

    pub fn strategy(&self) -> HashStrategy {
        self.strategy
    }

    // == Shard Index ==
    /// Returns the shard owning `key`, always in `[0, shard_count)`.
    pub fn shard_index(&self, key: &str) -> usize {
        let hash = match self.strategy {
            HashStrategy::Polynomial => polynomial_hash(key.as_bytes()),
            HashStrategy::Fnv1a => fnv1a_hash(key.as_bytes()),
        };
        (hash % self.shard_count as u64) as usize
    }
}

/// `hash = hash * 31 + byte` with wrapping signed arithmetic, then `|hash|`.
pub fn polynomial_hash(bytes: &[u8]) -> u64 {
    let hash = bytes.iter().fold(0i64, |hash, &b| {
        hash.wrapping_mul(31).wrapping_add(i64::from(b))
    });
    hash.unsigned_abs()
}

/// 64-bit FNV-1a.
pub fn fnv1a_hash(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}
