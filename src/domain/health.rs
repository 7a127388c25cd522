//! Health status model and classification rules.
//!
//! Each probe (database, supabase, system) resolves independently to a
//! [`ProbeState`]; the overall verdict is worst-of across the three. There
//! is no hysteresis: one bad tick flips the state, one good tick clears it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-probe state. `Slow` and `Warning` carry the same overall weight;
/// `Slow` exists to distinguish a working-but-degraded database read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeState {
    Unknown,
    Healthy,
    Warning,
    Slow,
    Error,
}

impl ProbeState {
    fn rank(self) -> u8 {
        match self {
            ProbeState::Healthy => 0,
            ProbeState::Unknown => 1,
            ProbeState::Warning | ProbeState::Slow => 2,
            ProbeState::Error => 3,
        }
    }
}

/// Outcome of one probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeStatus {
    pub status: ProbeState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    pub message: String,
}

impl ProbeStatus {
    pub fn unknown() -> Self {
        Self {
            status: ProbeState::Unknown,
            response_time_ms: None,
            message: "not yet probed".to_string(),
        }
    }
}

/// Combined verdict across all probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub database: ProbeStatus,
    pub supabase: ProbeStatus,
    pub system: ProbeStatus,
    pub overall: ProbeState,
    pub timestamp: DateTime<Utc>,
}

impl HealthStatus {
    pub fn unknown() -> Self {
        Self {
            database: ProbeStatus::unknown(),
            supabase: ProbeStatus::unknown(),
            system: ProbeStatus::unknown(),
            overall: ProbeState::Unknown,
            timestamp: Utc::now(),
        }
    }

    pub fn combine(database: ProbeStatus, supabase: ProbeStatus, system: ProbeStatus) -> Self {
        let overall = overall_health(database.status, supabase.status, system.status);
        Self {
            database,
            supabase,
            system,
            overall,
            timestamp: Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.overall == ProbeState::Healthy
    }
}

/// Worst-status-wins: any `Error` makes the whole service `Error`, any
/// `Warning`/`Slow` degrades it to `Warning`, otherwise `Healthy`.
pub fn overall_health(database: ProbeState, supabase: ProbeState, system: ProbeState) -> ProbeState {
    let worst = [database, supabase, system]
        .into_iter()
        .max_by_key(|s| s.rank())
        .unwrap_or(ProbeState::Unknown);
    match worst {
        ProbeState::Error => ProbeState::Error,
        ProbeState::Warning | ProbeState::Slow => ProbeState::Warning,
        ProbeState::Healthy => ProbeState::Healthy,
        ProbeState::Unknown => ProbeState::Unknown,
    }
}

/// Classifies a database read by its round-trip time.
pub fn classify_response_time(elapsed: Duration) -> ProbeState {
    let ms = elapsed.as_millis() as u64;
    if ms > 2000 {
        ProbeState::Slow
    } else if ms > 1000 {
        ProbeState::Warning
    } else {
        ProbeState::Healthy
    }
}

/// Classifies host memory pressure plus process uptime.
///
/// A process younger than 30 seconds reports a "recent restart" warning so
/// a crash loop is visible on the dashboard.
pub fn classify_system(memory_pressure: f64, uptime: Duration) -> ProbeStatus {
    if memory_pressure > 0.95 {
        ProbeStatus {
            status: ProbeState::Error,
            response_time_ms: None,
            message: format!("memory pressure critical: {:.1}%", memory_pressure * 100.0),
        }
    } else if memory_pressure > 0.85 {
        ProbeStatus {
            status: ProbeState::Warning,
            response_time_ms: None,
            message: format!("memory pressure elevated: {:.1}%", memory_pressure * 100.0),
        }
    } else if uptime < Duration::from_secs(30) {
        ProbeStatus {
            status: ProbeState::Warning,
            response_time_ms: None,
            message: format!("recent restart: up {}s", uptime.as_secs()),
        }
    } else {
        ProbeStatus {
            status: ProbeState::Healthy,
            response_time_ms: None,
            message: format!("memory pressure {:.1}%", memory_pressure * 100.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_error_dominates() {
        assert_eq!(
            overall_health(ProbeState::Error, ProbeState::Healthy, ProbeState::Healthy),
            ProbeState::Error
        );
        assert_eq!(
            overall_health(ProbeState::Healthy, ProbeState::Warning, ProbeState::Error),
            ProbeState::Error
        );
    }

    #[test]
    fn slow_database_degrades_to_warning() {
        assert_eq!(
            overall_health(ProbeState::Slow, ProbeState::Healthy, ProbeState::Healthy),
            ProbeState::Warning
        );
    }

    #[test]
    fn all_healthy_is_healthy() {
        assert_eq!(
            overall_health(ProbeState::Healthy, ProbeState::Healthy, ProbeState::Healthy),
            ProbeState::Healthy
        );
    }

    #[test]
    fn response_time_bands() {
        assert_eq!(
            classify_response_time(Duration::from_millis(150)),
            ProbeState::Healthy
        );
        assert_eq!(
            classify_response_time(Duration::from_millis(1500)),
            ProbeState::Warning
        );
        assert_eq!(
            classify_response_time(Duration::from_millis(2500)),
            ProbeState::Slow
        );
    }

    #[test]
    fn system_thresholds() {
        let up = Duration::from_secs(3600);
        assert_eq!(classify_system(0.96, up).status, ProbeState::Error);
        assert_eq!(classify_system(0.90, up).status, ProbeState::Warning);
        assert_eq!(classify_system(0.50, up).status, ProbeState::Healthy);
    }

    #[test]
    fn recent_restart_is_a_warning() {
        let status = classify_system(0.10, Duration::from_secs(5));
        assert_eq!(status.status, ProbeState::Warning);
        assert!(status.message.contains("recent restart"));
    }
}
