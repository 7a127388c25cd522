//! Process and host resource samples.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sample cap: ~24 hours at the 30 second cadence.
pub const SYSTEM_SAMPLES_CAP: usize = 2880;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MemoryUsage {
    /// Resident set size of this process, in bytes.
    pub rss_bytes: u64,
    /// Virtual memory of this process, in bytes.
    pub virtual_bytes: u64,
    /// Host memory currently in use, in bytes.
    pub system_used_bytes: u64,
    /// Total host memory, in bytes.
    pub system_total_bytes: u64,
}

impl MemoryUsage {
    /// Host memory pressure in `[0, 1]`.
    pub fn pressure(&self) -> f64 {
        if self.system_total_bytes == 0 {
            0.0
        } else {
            self.system_used_bytes as f64 / self.system_total_bytes as f64
        }
    }
}

/// One point-in-time resource sample.
#[derive(Debug, Clone, Serialize)]
pub struct SystemSample {
    pub timestamp: DateTime<Utc>,
    pub memory: MemoryUsage,
    pub uptime_secs: u64,
    pub cpu_percent: f32,
    pub load_average: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressure_is_a_fraction() {
        let mem = MemoryUsage {
            rss_bytes: 100,
            virtual_bytes: 200,
            system_used_bytes: 850,
            system_total_bytes: 1000,
        };
        assert!((mem.pressure() - 0.85).abs() < f64::EPSILON);
    }

    #[test]
    fn pressure_handles_zero_total() {
        let mem = MemoryUsage {
            rss_bytes: 0,
            virtual_bytes: 0,
            system_used_bytes: 0,
            system_total_bytes: 0,
        };
        assert_eq!(mem.pressure(), 0.0);
    }
}
