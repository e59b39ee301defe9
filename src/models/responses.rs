//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheStats, HashStrategy};
use crate::tasks::{MonitorState, MonitorStatus};

pub const STATUS_OK: &str = "OK";
pub const STATUS_ERROR: &str = "ERROR";

/// Envelope shared by the key-value endpoints and all error responses.
///
/// `{"status":"OK"|"ERROR", "message"?, "key"?, "value"?}`
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ApiResponse {
    /// Success with a message only
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            message: Some(message.into()),
            key: None,
            value: None,
        }
    }

    /// Success carrying a key and its value
    pub fn found(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            message: None,
            key: Some(key.into()),
            value: Some(value.into()),
        }
    }

    /// Failure with a message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            message: Some(message.into()),
            key: None,
            value: None,
        }
    }
}

/// Memory monitor section of the stats response
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSnapshot {
    pub state: MonitorState,
    /// Last sampled usage as a fraction of the ceiling
    pub memory_usage: f64,
    pub ticks: u64,
    pub pressure_ticks: u64,
    pub sample_failures: u64,
}

impl From<&MonitorStatus> for MonitorSnapshot {
    fn from(status: &MonitorStatus) -> Self {
        Self {
            state: status.state(),
            memory_usage: status.last_usage(),
            ticks: status.ticks(),
            pressure_ticks: status.pressure_ticks(),
            sample_failures: status.sample_failures(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Accounted size of all entries in bytes
    pub total_bytes: u64,
    /// Number of shards
    pub shard_count: usize,
    /// Hash used to map keys to shards
    pub hash_strategy: HashStrategy,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Memory monitor state
    pub monitor: MonitorSnapshot,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics and monitor status
    pub fn new(stats: &CacheStats, monitor: &MonitorStatus) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            total_entries: stats.total_entries,
            total_bytes: stats.total_bytes,
            shard_count: stats.shard_count,
            hash_strategy: stats.hash_strategy,
            hit_rate: stats.hit_rate(),
            monitor: MonitorSnapshot::from(monitor),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
