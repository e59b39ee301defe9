//! Memory Monitor Task
//!
//! Background task that periodically samples process memory and evicts a
//! batch of least recently used entries while usage is above the threshold.
//!
//! Each tick is evaluated on its own: there is no hysteresis band, so
//! sustained pressure evicts on every tick until usage drops.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::ShardedCache;
use crate::config::{Config, DEFAULT_MAX_MEMORY_BYTES, DEFAULT_MEMORY_THRESHOLD};
use crate::tasks::MemorySampler;

// == Monitor State ==
/// Idle between ticks, Evicting while a pressure batch runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorState {
    Idle,
    Evicting,
}

/// Result of a single monitor evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Memory could not be sampled; treated as no pressure
    SampleUnavailable,
    /// Usage below threshold, nothing evicted
    BelowThreshold { usage: f64 },
    /// Usage at or above threshold, a batch was evicted
    Evicted { usage: f64, freed_bytes: u64 },
}

// == Monitor Config ==
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Time between samples
    pub interval: Duration,
    /// Memory ceiling usage is measured against
    pub ceiling_bytes: u64,
    /// Usage fraction that triggers eviction
    pub threshold: f64,
    /// Eviction target per pressure tick
    pub batch_size: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            ceiling_bytes: DEFAULT_MAX_MEMORY_BYTES,
            threshold: DEFAULT_MEMORY_THRESHOLD,
            batch_size: 100,
        }
    }
}

impl MonitorConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.monitor_interval(),
            ceiling_bytes: config.max_memory_bytes.max(1),
            threshold: config.memory_threshold,
            batch_size: config.eviction_batch_size,
        }
    }
}

// == Monitor Status ==
/// Observable monitor state, shared with the stats endpoint.
#[derive(Debug, Default)]
pub struct MonitorStatus {
    last_usage_bits: AtomicU64,
    evicting: AtomicBool,
    ticks: AtomicU64,
    pressure_ticks: AtomicU64,
    sample_failures: AtomicU64,
}

impl MonitorStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Usage fraction from the most recent successful sample.
    pub fn last_usage(&self) -> f64 {
        f64::from_bits(self.last_usage_bits.load(Ordering::Relaxed))
    }

    pub fn state(&self) -> MonitorState {
        if self.evicting.load(Ordering::Acquire) {
            MonitorState::Evicting
        } else {
            MonitorState::Idle
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn pressure_ticks(&self) -> u64 {
        self.pressure_ticks.load(Ordering::Relaxed)
    }

    pub fn sample_failures(&self) -> u64 {
        self.sample_failures.load(Ordering::Relaxed)
    }

    fn record_usage(&self, usage: f64) {
        self.last_usage_bits.store(usage.to_bits(), Ordering::Relaxed);
    }

    fn set_state(&self, state: MonitorState) {
        self.evicting
            .store(state == MonitorState::Evicting, Ordering::Release);
    }
}

// == Memory Monitor ==
/// Compares sampled memory against a ceiling and evicts under pressure.
pub struct MemoryMonitor {
    cache: Arc<ShardedCache>,
    sampler: Box<dyn MemorySampler>,
    config: MonitorConfig,
    status: Arc<MonitorStatus>,
}

impl MemoryMonitor {
    pub fn new(
        cache: Arc<ShardedCache>,
        sampler: Box<dyn MemorySampler>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            cache,
            sampler,
            config,
            status: Arc::new(MonitorStatus::new()),
        }
    }

    /// Handle to the monitor's observable status.
    pub fn status(&self) -> Arc<MonitorStatus> {
        Arc::clone(&self.status)
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    // == Tick ==
    /// Runs one evaluation: sample, compare, evict if needed.
    ///
    /// The eviction runs synchronously and the monitor is back to Idle when
    /// this returns.
    pub fn tick(&self) -> TickOutcome {
        self.status.ticks.fetch_add(1, Ordering::Relaxed);

        let Some(allocated) = self.sampler.allocated_bytes() else {
            self.status.sample_failures.fetch_add(1, Ordering::Relaxed);
            debug!("Memory sample unavailable, skipping eviction");
            return TickOutcome::SampleUnavailable;
        };

        let usage = allocated as f64 / self.config.ceiling_bytes.max(1) as f64;
        self.status.record_usage(usage);

        if usage < self.config.threshold {
            debug!("Memory usage at {:.2}%, no eviction needed", usage * 100.0);
            return TickOutcome::BelowThreshold { usage };
        }

        self.status.set_state(MonitorState::Evicting);
        self.status.pressure_ticks.fetch_add(1, Ordering::Relaxed);
        warn!("Memory usage at {:.2}%, evicting cache entries", usage * 100.0);

        let freed_bytes = self.cache.evict_batch(self.config.batch_size);

        self.status.set_state(MonitorState::Idle);
        info!(
            "Pressure eviction freed {} bytes, cache now holds {} bytes",
            freed_bytes,
            self.cache.total_size()
        );

        TickOutcome::Evicted { usage, freed_bytes }
    }
}

/// Spawns the memory monitor as a background task.
///
/// The first evaluation happens one interval after spawning. The task runs
/// until aborted through the returned handle.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(ShardedCache::default());
/// let sampler = Box::new(ProcessMemorySampler::new());
/// let monitor = MemoryMonitor::new(cache, sampler, MonitorConfig::default());
/// let handle = spawn_memory_monitor(monitor);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_memory_monitor(monitor: MemoryMonitor) -> JoinHandle<()> {
    let interval = monitor.config.interval;

    tokio::spawn(async move {
        info!(
            "Starting memory monitor: interval={:?}, threshold={:.0}%, ceiling={} bytes, batch={}",
            interval,
            monitor.config.threshold * 100.0,
            monitor.config.ceiling_bytes,
            monitor.config.batch_size
        );

        loop {
            tokio::time::sleep(interval).await;
            monitor.tick();
        }
    })
}
