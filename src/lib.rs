//! Shard Cache - A sharded in-memory cache server
//!
//! Provides a string key-value cache split over independently locked LRU
//! shards, with a background monitor that evicts under memory pressure.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::ShardedCache;
pub use config::Config;
pub use tasks::{spawn_memory_monitor, MemoryMonitor, MonitorConfig, ProcessMemorySampler};
