//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Memory Monitor: evicts LRU entries while process memory is above threshold

mod memory;
mod monitor;

pub use memory::{MemorySampler, ProcessMemorySampler};
pub use monitor::{
    spawn_memory_monitor, MemoryMonitor, MonitorConfig, MonitorState, MonitorStatus, TickOutcome,
};
