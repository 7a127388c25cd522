//! Self-protection policy: memory pressure decides how often the health
//! probes run and whether WebSocket fan-out is allowed.
//!
//! This is a coarse load-shedding heuristic, not a backpressure protocol.
//! It lives in one place so the thresholds can be tuned and tested without
//! touching the monitoring loops.

use std::time::Duration;

/// Pressure at or above which WebSocket broadcasts are skipped.
const FANOUT_GATE: f64 = 0.90;

/// Probe cadence stretches as memory pressure rises, so the monitor does
/// not add load to an already struggling process.
pub fn health_check_interval(memory_pressure: f64) -> Duration {
    if memory_pressure < 0.75 {
        Duration::from_secs(30)
    } else if memory_pressure < 0.90 {
        Duration::from_secs(45)
    } else {
        Duration::from_secs(60)
    }
}

/// Whether events may be fanned out to WebSocket clients right now.
pub fn fanout_allowed(memory_pressure: f64) -> bool {
    memory_pressure < FANOUT_GATE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_stretches_under_pressure() {
        assert_eq!(health_check_interval(0.10), Duration::from_secs(30));
        assert_eq!(health_check_interval(0.80), Duration::from_secs(45));
        assert_eq!(health_check_interval(0.95), Duration::from_secs(60));
    }

    #[test]
    fn fanout_gates_at_ninety_percent() {
        assert!(fanout_allowed(0.89));
        assert!(!fanout_allowed(0.90));
        assert!(!fanout_allowed(0.99));
    }
}
