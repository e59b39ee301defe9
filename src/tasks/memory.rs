//! Memory Sampling
//!
//! Sources of the approximate process memory figure the monitor compares
//! against its ceiling.

use parking_lot::Mutex;
use sysinfo::{Pid, System};
use tracing::warn;

/// Reports how many bytes the process currently holds.
pub trait MemorySampler: Send + Sync {
    /// Returns `None` when the figure cannot be obtained.
    fn allocated_bytes(&self) -> Option<u64>;
}

// == Process Memory Sampler ==
/// Samples the resident memory of the current process via `sysinfo`.
///
/// This is process-wide, so it counts more than cache entries.
pub struct ProcessMemorySampler {
    system: Mutex<System>,
    pid: Option<Pid>,
}

impl ProcessMemorySampler {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                warn!("Cannot determine current pid, memory sampling disabled: {}", e);
                None
            }
        };
        Self {
            system: Mutex::new(System::new()),
            pid,
        }
    }
}

impl Default for ProcessMemorySampler {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySampler for ProcessMemorySampler {
    fn allocated_bytes(&self) -> Option<u64> {
        let pid = self.pid?;
        let mut system = self.system.lock();
        if !system.refresh_process(pid) {
            return None;
        }
        system.process(pid).map(|process| process.memory())
    }
}
