//! In-memory metric store: every aggregate the monitor maintains.
//!
//! Mutation is plain synchronous code; the [`PerformanceMonitor`] wraps the
//! store in one `RwLock` so each update is atomic with respect to other
//! tasks. Nothing here is persisted; the store is rebuilt empty on restart.
//!
//! [`PerformanceMonitor`]: super::monitor::PerformanceMonitor

use std::collections::HashMap;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::metrics::{
    ERRORS_CAP, SYSTEM_SAMPLES_CAP, BoundedBuffer, ErrorRecord, QueryCall, QueryMetric, Severity,
    SystemSample, UserActivityMetric,
};

/// Maximum alerts retained for the `/alerts` endpoint.
pub const ALERTS_CAP: usize = 100;

/// A raised alert. Logged and retained in memory; never delivered
/// externally.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub id: Uuid,
    pub kind: String,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(kind: &str, severity: Severity, message: &str, data: Option<Value>) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind: kind.to_string(),
            severity,
            message: message.to_string(),
            data,
            created_at: Utc::now(),
        }
    }
}

pub struct MetricStore {
    pub queries: HashMap<String, QueryMetric>,
    pub users: HashMap<String, UserActivityMetric>,
    pub errors: BoundedBuffer<ErrorRecord>,
    pub system: BoundedBuffer<SystemSample>,
    pub alerts: BoundedBuffer<Alert>,
}

impl Default for MetricStore {
    fn default() -> Self {
        Self {
            queries: HashMap::new(),
            users: HashMap::new(),
            errors: BoundedBuffer::new(ERRORS_CAP),
            system: BoundedBuffer::new(SYSTEM_SAMPLES_CAP),
            alerts: BoundedBuffer::new(ALERTS_CAP),
        }
    }
}

impl MetricStore {
    pub fn record_query(&mut self, name: &str, call: QueryCall) {
        self.queries.entry(name.to_string()).or_default().record(call);
    }

    pub fn track_activity(&mut self, user_id: &str, action: &str, details: Option<Value>) {
        self.users
            .entry(user_id.to_string())
            .or_insert_with(|| UserActivityMetric::new(Utc::now()))
            .record(action, details);
    }

    pub fn record_error(&mut self, record: ErrorRecord) {
        self.errors.push(record);
    }

    pub fn push_sample(&mut self, sample: SystemSample) {
        self.system.push(sample);
    }

    pub fn push_alert(&mut self, alert: Alert) {
        self.alerts.push(alert);
    }

    pub fn total_query_calls(&self) -> u64 {
        self.queries.values().map(|m| m.total_calls).sum()
    }

    pub fn total_query_errors(&self) -> u64 {
        self.queries.values().map(|m| m.error_count).sum()
    }

    pub fn total_query_duration_ms(&self) -> u64 {
        self.queries.values().map(|m| m.total_duration_ms).sum()
    }

    /// Mean duration across every recorded call, `0.0` with no calls.
    pub fn avg_query_time_ms(&self) -> f64 {
        let calls = self.total_query_calls();
        if calls == 0 {
            0.0
        } else {
            self.total_query_duration_ms() as f64 / calls as f64
        }
    }

    /// Failed calls over total calls, always in `[0, 1]`.
    pub fn overall_error_rate(&self) -> f64 {
        let calls = self.total_query_calls();
        if calls == 0 {
            0.0
        } else {
            self.total_query_errors() as f64 / calls as f64
        }
    }

    /// Errors recorded within the trailing window, divided by total query
    /// calls. Capped at `1.0`; `0.0` when no calls have been recorded.
    pub fn recent_error_rate(&self, window: ChronoDuration) -> f64 {
        let calls = self.total_query_calls();
        if calls == 0 {
            return 0.0;
        }
        let cutoff = Utc::now() - window;
        let recent = self.errors.iter().filter(|e| e.timestamp > cutoff).count();
        (recent as f64 / calls as f64).min(1.0)
    }

    pub fn total_actions(&self) -> u64 {
        self.users.values().map(|u| u.total_actions).sum()
    }

    pub fn total_sessions(&self) -> usize {
        self.users.values().map(|u| u.sessions.len()).sum()
    }
}
