//! Process and host resource sampling via `sysinfo`.

use std::sync::Mutex;

use sysinfo::{Pid, System};

use crate::domain::metrics::MemoryUsage;

/// Snapshot of the resources relevant to the monitor.
#[derive(Debug, Clone, Copy)]
pub struct ResourceSnapshot {
    pub memory: MemoryUsage,
    pub cpu_percent: f32,
    pub load_average: f64,
}

/// Shared sampler; refreshes are cheap but `sysinfo::System` needs `&mut`,
/// so reads go through a short-lived lock.
pub struct SystemSampler {
    system: Mutex<System>,
    pid: Option<Pid>,
}

impl SystemSampler {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new_all()),
            pid: sysinfo::get_current_pid().ok(),
        }
    }

    pub fn sample(&self) -> ResourceSnapshot {
        let mut system = self.system.lock().expect("system sampler lock poisoned");
        system.refresh_memory();
        system.refresh_cpu_usage();
        if let Some(pid) = self.pid {
            system.refresh_process(pid);
        }

        let process = self.pid.and_then(|pid| system.process(pid));
        let memory = MemoryUsage {
            rss_bytes: process.map(|p| p.memory()).unwrap_or(0),
            virtual_bytes: process.map(|p| p.virtual_memory()).unwrap_or(0),
            system_used_bytes: system.used_memory(),
            system_total_bytes: system.total_memory(),
        };

        ResourceSnapshot {
            memory,
            cpu_percent: system.global_cpu_info().cpu_usage(),
            load_average: System::load_average().one,
        }
    }

    /// Current host memory pressure in `[0, 1]`.
    pub fn memory_pressure(&self) -> f64 {
        self.sample().memory.pressure()
    }
}

impl Default for SystemSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_reports_plausible_values() {
        let sampler = SystemSampler::new();
        let snapshot = sampler.sample();
        assert!(snapshot.memory.system_total_bytes > 0);
        let pressure = snapshot.memory.pressure();
        assert!((0.0..=1.0).contains(&pressure));
    }
}
