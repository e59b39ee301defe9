//! Cache Entry Module
//!
//! Defines the structure for individual cache entries and their size accounting.

use std::time::Instant;

use crate::cache::ENTRY_OVERHEAD;

// == Cache Entry ==
/// Represents a single cache entry owned by exactly one shard.
///
/// The key is stored alongside the value so that evicting the node at the
/// back of a shard's recency list can drop the index entry directly.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The key this entry is stored under
    pub key: String,
    /// The stored value
    pub value: String,
    /// Monotonic timestamp of the last read or write
    pub last_access: Instant,
    /// Accounted size: key + value + fixed overhead
    pub size_bytes: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry and computes its accounted size.
    pub fn new(key: String, value: String) -> Self {
        let size_bytes = entry_size(&key, &value);
        Self {
            key,
            value,
            last_access: Instant::now(),
            size_bytes,
        }
    }

    // == Replace Value ==
    /// Overwrites the value in place and refreshes the access marker.
    ///
    /// # Returns
    /// The signed size change (`new_size - old_size`).
    pub fn replace_value(&mut self, value: String) -> i64 {
        let old_size = self.size_bytes;
        self.size_bytes = entry_size(&self.key, &value);
        self.value = value;
        self.touch();
        self.size_bytes as i64 - old_size as i64
    }

    // == Touch ==
    /// Marks the entry as accessed now.
    pub fn touch(&mut self) {
        self.last_access = Instant::now();
    }
}

// == Utility Functions ==
/// Accounted size of an entry holding `key` and `value`.
pub fn entry_size(key: &str, value: &str) -> u64 {
    (key.len() + value.len() + ENTRY_OVERHEAD) as u64
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("key".to_string(), "value".to_string());

        assert_eq!(entry.key, "key");
        assert_eq!(entry.value, "value");
        assert_eq!(entry.size_bytes, (3 + 5 + ENTRY_OVERHEAD) as u64);
    }

    #[test]
    fn test_entry_size_empty_strings() {
        assert_eq!(entry_size("", ""), ENTRY_OVERHEAD as u64);
    }

    #[test]
    fn test_replace_value_grows() {
        let mut entry = CacheEntry::new("k".to_string(), "ab".to_string());

        let delta = entry.replace_value("abcdef".to_string());

        assert_eq!(delta, 4);
        assert_eq!(entry.value, "abcdef");
        assert_eq!(entry.size_bytes, entry_size("k", "abcdef"));
    }

    #[test]
    fn test_replace_value_shrinks() {
        let mut entry = CacheEntry::new("k".to_string(), "abcdef".to_string());

        let delta = entry.replace_value("a".to_string());

        assert_eq!(delta, -5);
        assert_eq!(entry.size_bytes, entry_size("k", "a"));
    }

    #[test]
    fn test_touch_refreshes_last_access() {
        let mut entry = CacheEntry::new("k".to_string(), "v".to_string());
        let created = entry.last_access;
        sleep(Duration::from_millis(5));

        entry.touch();
        assert!(entry.last_access > created);
    }

    #[test]
    fn test_replace_value_refreshes_last_access() {
        let mut entry = CacheEntry::new("k".to_string(), "v".to_string());
        let created = entry.last_access;
        sleep(Duration::from_millis(5));

        entry.replace_value("v2".to_string());
        assert!(entry.last_access > created);
    }
}
