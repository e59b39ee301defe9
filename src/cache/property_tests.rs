//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache's accounting and ordering guarantees over
//! generated operation sequences.

use proptest::prelude::*;
use std::collections::HashMap;

use crate::cache::{
    entry_size, HashStrategy, Partitioner, Shard, ShardedCache, MAX_KEY_SIZE, MAX_VALUE_SIZE,
};
use crate::error::CacheError;

// == Test Configuration ==
const TEST_NUM_SHARDS: usize = 8;

// == Strategies ==
/// Generates valid cache keys (within length limit)
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:]{1,64}".prop_map(|s| s)
}

/// Generates valid cache values (within size limit)
fn valid_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,256}".prop_map(|s| s)
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: String, value: String },
    Get { key: String },
    Delete { key: String },
    EvictBatch { count: usize },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    // A small key space makes overwrites and hits likely
    let key = "k[0-9]{1,2}";
    prop_oneof![
        4 => (key, valid_value_strategy()).prop_map(|(key, value)| CacheOp::Put { key, value }),
        3 => key.prop_map(|key| CacheOp::Get { key }),
        1 => key.prop_map(|key| CacheOp::Delete { key }),
        1 => (0usize..40).prop_map(|count| CacheOp::EvictBatch { count }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Round trip: a valid put is immediately readable.
    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), value in valid_value_strategy()) {
        let cache = ShardedCache::new(TEST_NUM_SHARDS);

        cache.put(key.clone(), value.clone()).unwrap();

        prop_assert_eq!(cache.get(&key).unwrap(), Some(value));
    }

    // The same key always lands on the same shard.
    #[test]
    fn prop_partitioning_is_deterministic(key in ".{0,300}", shards in 1usize..128) {
        for strategy in [HashStrategy::Polynomial, HashStrategy::Fnv1a] {
            let p = Partitioner::with_strategy(shards, strategy);
            let first = p.shard_index(&key);
            prop_assert!(first < shards);
            for _ in 0..5 {
                prop_assert_eq!(p.shard_index(&key), first);
            }
            prop_assert_eq!(Partitioner::with_strategy(shards, strategy).shard_index(&key), first);
        }
    }

    // Overwriting leaves one entry whose size reflects only the last value.
    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        value1 in valid_value_strategy(),
        value2 in valid_value_strategy()
    ) {
        let cache = ShardedCache::new(TEST_NUM_SHARDS);

        cache.put(key.clone(), value1).unwrap();
        cache.put(key.clone(), value2.clone()).unwrap();

        prop_assert_eq!(cache.len(), 1);
        prop_assert_eq!(cache.total_size(), entry_size(&key, &value2));
        prop_assert_eq!(cache.get(&key).unwrap(), Some(value2));
    }

    // Lengths above the limit are rejected, at or below are accepted.
    #[test]
    fn prop_validation_boundary(key_len in 0usize..300, value_len in 0usize..300) {
        let cache = ShardedCache::new(TEST_NUM_SHARDS);
        let key = "k".repeat(key_len);
        let value = "v".repeat(value_len);

        let result = cache.put(key, value);

        if key_len <= MAX_KEY_SIZE && value_len <= MAX_VALUE_SIZE {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(matches!(result, Err(CacheError::Validation(_))));
            prop_assert_eq!(cache.total_size(), 0);
        }
    }

    // Global and per-shard size totals never drift from the live entries,
    // and reads agree with a reference model of the surviving keys.
    #[test]
    fn prop_size_accounting_no_drift(ops in prop::collection::vec(cache_op_strategy(), 1..120)) {
        let cache = ShardedCache::new(TEST_NUM_SHARDS);
        let mut model: HashMap<String, String> = HashMap::new();

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    cache.put(key.clone(), value.clone()).unwrap();
                    model.insert(key, value);
                }
                CacheOp::Get { key } => {
                    match cache.get(&key).unwrap() {
                        Some(value) => {
                            prop_assert_eq!(Some(&value), model.get(&key));
                        }
                        None => {
                            prop_assert!(model.get(&key).is_none());
                        }
                    }
                }
                CacheOp::Delete { key } => {
                    match cache.delete(&key) {
                        Ok(()) => {
                            prop_assert!(model.remove(&key).is_some());
                        }
                        Err(err) => {
                            prop_assert!(matches!(err, CacheError::NotFound(_)));
                            prop_assert!(model.remove(&key).is_none());
                        }
                    }
                }
                CacheOp::EvictBatch { count } => {
                    cache.evict_batch(count);
                    model.retain(|k, _| cache.contains_key(k));
                }
            }

            let shard_sum: u64 = cache.shard_sizes().iter().sum();
            prop_assert_eq!(cache.total_size(), shard_sum);
        }

        let expected: u64 = model.iter().map(|(k, v)| entry_size(k, v)).sum();
        prop_assert_eq!(cache.total_size(), expected);
        prop_assert_eq!(cache.len(), model.len());
    }

    // Within a shard, a read protects the entry from the next eviction.
    #[test]
    fn prop_get_protects_from_next_eviction(
        keys in prop::collection::hash_set(valid_key_strategy(), 3..10),
        pick in any::<prop::sample::Index>()
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let shard = Shard::new();
        for key in &keys {
            shard.put(key.clone(), format!("value_{key}")).unwrap();
        }

        let touched = pick.get(&keys).clone();
        shard.get(&touched).unwrap();
        let expected_victim = if touched == keys[0] { &keys[1] } else { &keys[0] };

        shard.evict_one();

        prop_assert!(shard.get(expected_victim).unwrap().is_none());
        prop_assert!(shard.get(&touched).unwrap().is_some());
        prop_assert_eq!(shard.len(), keys.len() - 1);
    }

    // Batch eviction frees at most the per-shard quota from each shard and
    // at least one entry from every non-empty shard.
    #[test]
    fn prop_evict_batch_quota(
        entries in prop::collection::vec((valid_key_strategy(), valid_value_strategy()), 0..200),
        target in 0usize..200
    ) {
        let cache = ShardedCache::new(TEST_NUM_SHARDS);
        for (key, value) in entries {
            cache.put(key, value).unwrap();
        }
        let before = cache.shard_lens();
        let size_before = cache.total_size();
        let quota = (target / TEST_NUM_SHARDS).max(1);

        let freed = cache.evict_batch(target);

        let after = cache.shard_lens();
        for (b, a) in before.iter().zip(after.iter()) {
            prop_assert_eq!(b - a, quota.min(*b));
        }
        prop_assert_eq!(cache.total_size(), size_before - freed);
    }
}
