//! Shard Module
//!
//! An independently locked partition of the key space.
//!
//! # Design
//!
//! - One `RwLock` guards the index, the recency list and the size total
//!   together, so they are never observed out of step
//! - `get` promotes the entry, so it takes the write lock for the whole
//!   lookup-and-promote critical section
//! - Eviction pops the list tail and removes the index entry by the key stored
//!   in the entry itself, O(1)

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::error;

use crate::cache::lru::{NodeId, RecencyList};
use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};

#[derive(Debug, Default)]
struct ShardInner {
    /// Key → recency node
    index: HashMap<String, NodeId>,
    /// MRU at the front, LRU at the back
    recency: RecencyList<CacheEntry>,
    /// Sum of `size_bytes` over all entries
    size_bytes: u64,
}

impl ShardInner {
    fn evict_lru(&mut self) -> Option<CacheEntry> {
        let entry = self.recency.pop_back()?;
        self.index.remove(&entry.key);
        self.size_bytes = self.size_bytes.saturating_sub(entry.size_bytes);
        Some(entry)
    }
}

// == Shard ==
/// Single shard of a [`ShardedCache`](crate::cache::ShardedCache).
#[derive(Debug, Default)]
pub struct Shard {
    inner: RwLock<ShardInner>,
}

impl Shard {
    /// Create a new empty shard
    pub fn new() -> Self {
        Self::default()
    }

    // == Put ==
    /// Inserts or overwrites `key` and promotes it to most recently used.
    ///
    /// # Returns
    /// The signed change in this shard's accounted size, for the caller to
    /// apply to the global total.
    ///
    /// # Errors
    /// `CacheError::Internal` if the index points at a missing recency node.
    /// The shard is left untouched in that case.
    pub fn put(&self, key: String, value: String) -> Result<i64> {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        if let Some(&id) = inner.index.get(&key) {
            let entry = inner
                .recency
                .get_mut(id)
                .ok_or_else(|| missing_node(&key))?;
            let delta = entry.replace_value(value);
            inner.recency.move_to_front(id);
            inner.size_bytes = apply_delta(inner.size_bytes, delta);
            return Ok(delta);
        }

        let entry = CacheEntry::new(key.clone(), value);
        let size = entry.size_bytes;
        let id = inner.recency.push_front(entry);
        inner.index.insert(key, id);
        inner.size_bytes += size;
        Ok(size as i64)
    }

    // == Get ==
    /// Looks up `key` and promotes it on a hit, under one write lock.
    ///
    /// # Errors
    /// `CacheError::Internal` if the index points at a missing recency node.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let Some(&id) = inner.index.get(key) else {
            return Ok(None);
        };
        let entry = inner.recency.get_mut(id).ok_or_else(|| missing_node(key))?;
        entry.touch();
        let value = entry.value.clone();
        inner.recency.move_to_front(id);
        Ok(Some(value))
    }

    // == Remove ==
    /// Deletes `key`, returning the freed bytes if it was present.
    ///
    /// # Errors
    /// `CacheError::Internal` if the index points at a missing recency node.
    pub fn remove(&self, key: &str) -> Result<Option<u64>> {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let Some(&id) = inner.index.get(key) else {
            return Ok(None);
        };
        let entry = inner.recency.remove(id).ok_or_else(|| missing_node(key))?;
        inner.index.remove(key);
        inner.size_bytes = inner.size_bytes.saturating_sub(entry.size_bytes);
        Ok(Some(entry.size_bytes))
    }

    // == Evict One ==
    /// Removes the least recently used entry, returning the freed bytes
    /// (0 when the shard is empty).
    pub fn evict_one(&self) -> u64 {
        self.inner
            .write()
            .evict_lru()
            .map_or(0, |entry| entry.size_bytes)
    }

    /// Evicts up to `quota` entries under a single lock acquisition, stopping
    /// early once the shard is empty.
    ///
    /// # Returns
    /// `(entries_evicted, bytes_freed)`
    pub fn evict_up_to(&self, quota: usize) -> (usize, u64) {
        let mut inner = self.inner.write();
        let mut count = 0;
        let mut freed = 0;
        while count < quota {
            match inner.evict_lru() {
                Some(entry) => {
                    count += 1;
                    freed += entry.size_bytes;
                }
                None => break,
            }
        }
        (count, freed)
    }

    /// Get total accounted size of this shard in bytes
    pub fn current_size(&self) -> u64 {
        self.inner.read().size_bytes
    }

    /// Get the number of entries in this shard
    pub fn len(&self) -> usize {
        self.inner.read().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys ordered from most to least recently used.
    #[cfg(test)]
    pub(crate) fn keys_by_recency(&self) -> Vec<String> {
        self.inner
            .read()
            .recency
            .iter()
            .map(|entry| entry.key.clone())
            .collect()
    }

    /// Presence check that leaves recency order alone.
    #[cfg(test)]
    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.inner.read().index.contains_key(key)
    }

    /// Drops the recency node for `key` while keeping its index entry.
    #[cfg(test)]
    pub(crate) fn detach_recency_node(&self, key: &str) {
        let mut inner = self.inner.write();
        if let Some(&id) = inner.index.get(key) {
            inner.recency.remove(id);
        }
    }
}

fn missing_node(key: &str) -> CacheError {
    error!(key = %key, "index entry has no recency node");
    CacheError::Internal(format!("shard index out of step with recency list for key '{}'", key))
}

fn apply_delta(size: u64, delta: i64) -> u64 {
    if delta >= 0 {
        size + delta as u64
    } else {
        size.saturating_sub(delta.unsigned_abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::entry::entry_size;
    use std::sync::Arc;
    use std::thread;

    fn put(shard: &Shard, key: &str, value: &str) -> i64 {
        shard.put(key.to_string(), value.to_string()).unwrap()
    }

    fn get(shard: &Shard, key: &str) -> Option<String> {
        shard.get(key).unwrap()
    }

    #[test]
    fn test_put_new_key_returns_full_size() {
        let shard = Shard::new();
        let delta = put(&shard, "a", "value");

        assert_eq!(delta, entry_size("a", "value") as i64);
        assert_eq!(shard.current_size(), entry_size("a", "value"));
        assert_eq!(shard.len(), 1);
    }

    #[test]
    fn test_put_existing_key_returns_difference() {
        let shard = Shard::new();
        put(&shard, "a", "12345");
        let delta = put(&shard, "a", "12");

        assert_eq!(delta, -3);
        assert_eq!(shard.len(), 1);
        assert_eq!(shard.current_size(), entry_size("a", "12"));
        assert_eq!(get(&shard, "a"), Some("12".to_string()));
    }

    #[test]
    fn test_get_missing() {
        let shard = Shard::new();
        assert_eq!(get(&shard, "missing"), None);
    }

    #[test]
    fn test_get_promotes_entry() {
        let shard = Shard::new();
        put(&shard, "A", "1");
        put(&shard, "B", "2");
        put(&shard, "C", "3");

        assert_eq!(get(&shard, "A"), Some("1".to_string()));
        assert_eq!(shard.keys_by_recency(), vec!["A", "C", "B"]);

        let freed = shard.evict_one();
        assert_eq!(freed, entry_size("B", "2"));
        assert_eq!(get(&shard, "B"), None);
        assert!(get(&shard, "A").is_some());
        assert!(get(&shard, "C").is_some());
    }

    #[test]
    fn test_put_overwrite_promotes_entry() {
        let shard = Shard::new();
        put(&shard, "A", "1");
        put(&shard, "B", "2");
        put(&shard, "A", "updated");

        shard.evict_one();
        assert_eq!(get(&shard, "B"), None);
        assert_eq!(get(&shard, "A"), Some("updated".to_string()));
    }

    #[test]
    fn test_evict_one_empty_shard() {
        let shard = Shard::new();
        assert_eq!(shard.evict_one(), 0);
        assert_eq!(shard.current_size(), 0);
    }

    #[test]
    fn test_evict_until_empty_resets_size() {
        let shard = Shard::new();
        for i in 0..10 {
            put(&shard, &format!("k{i}"), "v");
        }

        let mut freed = 0;
        while !shard.is_empty() {
            freed += shard.evict_one();
        }

        assert_eq!(freed, 10 * entry_size("k0", "v"));
        assert_eq!(shard.current_size(), 0);
    }

    #[test]
    fn test_evict_up_to_stops_when_empty() {
        let shard = Shard::new();
        put(&shard, "a", "1");
        put(&shard, "b", "2");

        let (count, freed) = shard.evict_up_to(5);

        assert_eq!(count, 2);
        assert_eq!(freed, entry_size("a", "1") + entry_size("b", "2"));
        assert!(shard.is_empty());
    }

    #[test]
    fn test_evict_up_to_takes_oldest_first() {
        let shard = Shard::new();
        put(&shard, "a", "1");
        put(&shard, "b", "2");
        put(&shard, "c", "3");

        let (count, _) = shard.evict_up_to(2);

        assert_eq!(count, 2);
        assert_eq!(shard.keys_by_recency(), vec!["c"]);
    }

    #[test]
    fn test_remove() {
        let shard = Shard::new();
        put(&shard, "a", "1");
        put(&shard, "b", "2");

        assert_eq!(shard.remove("a").unwrap(), Some(entry_size("a", "1")));
        assert_eq!(shard.remove("a").unwrap(), None);
        assert_eq!(shard.len(), 1);
        assert_eq!(shard.current_size(), entry_size("b", "2"));
    }

    #[test]
    fn test_concurrent_puts_and_gets_keep_size_consistent() {
        let shard = Arc::new(Shard::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let shard = Arc::clone(&shard);
                thread::spawn(move || {
                    for i in 0..200 {
                        let key = format!("k{}", i % 50);
                        shard.put(key.clone(), format!("t{t}-{i}")).unwrap();
                        let _ = shard.get(&key);
                        if i % 7 == 0 {
                            shard.evict_one();
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let keys = shard.keys_by_recency();
        assert_eq!(keys.len(), shard.len());
        let expected: u64 = keys
            .iter()
            .map(|k| entry_size(k, &get(&shard, k).unwrap()))
            .sum();
        assert_eq!(shard.current_size(), expected);
    }

    #[test]
    fn test_get_with_missing_node_is_internal_error() {
        let shard = Shard::new();
        put(&shard, "a", "1");
        let size = shard.current_size();
        shard.detach_recency_node("a");

        assert!(matches!(shard.get("a"), Err(CacheError::Internal(_))));
        assert_eq!(shard.current_size(), size);
    }

    #[test]
    fn test_put_with_missing_node_leaves_size_unchanged() {
        let shard = Shard::new();
        put(&shard, "a", "1");
        put(&shard, "b", "2");
        let size = shard.current_size();
        shard.detach_recency_node("a");

        let result = shard.put("a".to_string(), "22".to_string());

        assert!(matches!(result, Err(CacheError::Internal(_))));
        assert_eq!(shard.current_size(), size);
        assert_eq!(shard.len(), 2);
        assert_eq!(get(&shard, "b"), Some("2".to_string()));
    }

    #[test]
    fn test_remove_with_missing_node_is_internal_error() {
        let shard = Shard::new();
        put(&shard, "a", "1");
        let size = shard.current_size();
        shard.detach_recency_node("a");

        assert!(matches!(shard.remove("a"), Err(CacheError::Internal(_))));
        assert_eq!(shard.current_size(), size);
    }
}
