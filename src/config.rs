//! Configuration Module
//!
//! Handles loading server and cache configuration from environment variables.
//! Values are read once at startup and never change afterwards.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{DEFAULT_NUM_SHARDS, MAX_KEY_SIZE, MAX_VALUE_SIZE};

/// Default memory ceiling: 1.5 GiB
pub const DEFAULT_MAX_MEMORY_BYTES: u64 = 1536 * 1024 * 1024;

/// Default pressure threshold as a fraction of the ceiling
pub const DEFAULT_MEMORY_THRESHOLD: f64 = 0.70;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Number of cache shards
    pub num_shards: usize,
    /// Maximum key length in bytes
    pub max_key_size: usize,
    /// Maximum value length in bytes
    pub max_value_size: usize,
    /// Memory ceiling the monitor measures usage against
    pub max_memory_bytes: u64,
    /// Usage fraction of the ceiling that triggers eviction
    pub memory_threshold: f64,
    /// Memory monitor interval in seconds
    pub monitor_interval: u64,
    /// Entries evicted per pressure tick
    pub eviction_batch_size: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 7171)
    /// - `NUM_SHARDS` - Number of shards (default: 32, minimum 1)
    /// - `MAX_KEY_SIZE` - Maximum key length (default: 256)
    /// - `MAX_VALUE_SIZE` - Maximum value length (default: 256)
    /// - `MAX_MEMORY_BYTES` - Memory ceiling (default: 1.5 GiB)
    /// - `MEMORY_THRESHOLD` - Pressure threshold fraction (default: 0.70)
    /// - `MONITOR_INTERVAL` - Monitor frequency in seconds (default: 5)
    /// - `EVICTION_BATCH_SIZE` - Entries per eviction batch (default: 100)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            num_shards: env_or("NUM_SHARDS", defaults.num_shards),
            max_key_size: env_or("MAX_KEY_SIZE", defaults.max_key_size),
            max_value_size: env_or("MAX_VALUE_SIZE", defaults.max_value_size),
            max_memory_bytes: env_or("MAX_MEMORY_BYTES", defaults.max_memory_bytes),
            memory_threshold: env_or("MEMORY_THRESHOLD", defaults.memory_threshold),
            monitor_interval: env_or("MONITOR_INTERVAL", defaults.monitor_interval),
            eviction_batch_size: env_or("EVICTION_BATCH_SIZE", defaults.eviction_batch_size),
        }
        .sanitized()
    }

    /// Clamps values that would make the cache or monitor unusable.
    pub fn sanitized(mut self) -> Self {
        self.num_shards = self.num_shards.max(1);
        self.max_memory_bytes = self.max_memory_bytes.max(1);
        self.monitor_interval = self.monitor_interval.max(1);
        if !(self.memory_threshold > 0.0 && self.memory_threshold <= 1.0) {
            self.memory_threshold = DEFAULT_MEMORY_THRESHOLD;
        }
        self
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.monitor_interval)
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 7171,
            num_shards: DEFAULT_NUM_SHARDS,
            max_key_size: MAX_KEY_SIZE,
            max_value_size: MAX_VALUE_SIZE,
            max_memory_bytes: DEFAULT_MAX_MEMORY_BYTES,
            memory_threshold: DEFAULT_MEMORY_THRESHOLD,
            monitor_interval: 5,
            eviction_batch_size: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 7171);
        assert_eq!(config.num_shards, 32);
        assert_eq!(config.max_key_size, 256);
        assert_eq!(config.max_value_size, 256);
        assert_eq!(config.max_memory_bytes, 1_610_612_736);
        assert_eq!(config.memory_threshold, 0.70);
        assert_eq!(config.monitor_interval(), Duration::from_secs(5));
        assert_eq!(config.eviction_batch_size, 100);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        for name in [
            "SERVER_PORT",
            "NUM_SHARDS",
            "MAX_KEY_SIZE",
            "MAX_VALUE_SIZE",
            "MAX_MEMORY_BYTES",
            "MEMORY_THRESHOLD",
            "MONITOR_INTERVAL",
            "EVICTION_BATCH_SIZE",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env();
        assert_eq!(config.server_port, 7171);
        assert_eq!(config.num_shards, 32);
        assert_eq!(config.eviction_batch_size, 100);
    }

    #[test]
    fn test_sanitized_clamps_invalid_values() {
        let config = Config {
            num_shards: 0,
            max_memory_bytes: 0,
            memory_threshold: 1.5,
            monitor_interval: 0,
            ..Config::default()
        }
        .sanitized();

        assert_eq!(config.num_shards, 1);
        assert_eq!(config.max_memory_bytes, 1);
        assert_eq!(config.memory_threshold, DEFAULT_MEMORY_THRESHOLD);
        assert_eq!(config.monitor_interval, 1);
    }

    #[test]
    fn test_sanitized_rejects_nan_threshold() {
        let config = Config {
            memory_threshold: f64::NAN,
            ..Config::default()
        }
        .sanitized();
        assert_eq!(config.memory_threshold, DEFAULT_MEMORY_THRESHOLD);
    }
}
