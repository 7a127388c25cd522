//! Reduced metrics projection persisted to the daily JSONL history.
//!
//! This is the only state that survives a restart. It is deliberately a
//! subset of the live snapshot: enough for trend analysis, nothing more.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::health::ProbeState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthProjection {
    pub database: ProbeState,
    pub supabase: ProbeState,
    pub system: ProbeState,
    pub overall: ProbeState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceProjection {
    pub total_queries: u64,
    pub total_errors: u64,
    pub avg_query_time_ms: f64,
    pub error_rate: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConnectionCounts {
    pub subscribers: usize,
    pub ws_clients: usize,
}

/// One line of the daily `metrics-<date>.jsonl` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    pub timestamp: DateTime<Utc>,
    pub health: HealthProjection,
    pub performance: PerformanceProjection,
    pub memory_pressure: f64,
    pub connections: ConnectionCounts,
}
