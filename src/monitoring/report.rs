//! Read models produced by the monitor and the realtime system, plus the
//! rule-based issue and recommendation derivations.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::health::{HealthStatus, ProbeState};
use crate::domain::metrics::{ErrorRecord, SystemSample, Trend};
use crate::domain::snapshot::ConnectionCounts;

/// Trend threshold for the in-process system-metric window.
pub const SYSTEM_TREND_THRESHOLD_PCT: f64 = 10.0;
/// Trend threshold for the multi-day historical window.
pub const HISTORY_TREND_THRESHOLD_PCT: f64 = 20.0;

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub total_queries: u64,
    pub total_errors: u64,
    pub unique_users: usize,
    pub avg_query_time_ms: f64,
    pub error_rate: f64,
}

/// One operation's aggregate, flattened for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub name: String,
    pub total_calls: u64,
    pub success_count: u64,
    pub error_count: u64,
    pub avg_duration_ms: f64,
    pub max_duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_duration_ms: Option<u64>,
    pub error_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivitySummary {
    pub unique_users: usize,
    pub total_actions: u64,
    pub total_sessions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemReport {
    pub sample_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<SystemSample>,
    pub memory_trend: Trend,
    pub cpu_trend: Trend,
}

/// Full output of `PerformanceMonitor::generate_report`.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    pub generated_at: DateTime<Utc>,
    pub uptime_secs: u64,
    pub summary: ReportSummary,
    pub queries: Vec<QueryReport>,
    pub errors: Vec<ErrorRecord>,
    pub user_activity: ActivitySummary,
    pub system: SystemReport,
}

/// Live snapshot fanned out to subscribers every collection tick.
#[derive(Debug, Clone, Serialize)]
pub struct RealtimeSnapshot {
    pub timestamp: DateTime<Utc>,
    pub health: HealthStatus,
    pub performance: ReportSummary,
    pub memory_pressure: f64,
    pub connections: ConnectionCounts,
}

/// Composite for direct HTTP consumption.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub health: HealthStatus,
    pub top_queries: Vec<QueryReport>,
    pub recent_errors: Vec<ErrorRecord>,
    pub user_activity: ActivitySummary,
    pub system: SystemReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendSet {
    pub avg_query_time: Trend,
    pub error_rate: Trend,
    pub memory_pressure: Trend,
}

/// Dashboard data enriched with historical trends, issues, and advice.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringReport {
    pub generated_at: DateTime<Utc>,
    pub dashboard: DashboardData,
    pub trends: TrendSet,
    pub top_issues: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Flags the conditions worth a human look: degraded health, an elevated
/// error rate, or any operation averaging above one second.
pub fn top_issues(health: &HealthStatus, error_rate: f64, queries: &[QueryReport]) -> Vec<String> {
    let mut issues = Vec::new();
    if health.overall != ProbeState::Healthy {
        issues.push(format!("service health is {:?}", health.overall).to_lowercase());
    }
    if error_rate > 0.05 {
        issues.push(format!("error rate at {:.1}%", error_rate * 100.0));
    }
    for query in queries {
        if query.avg_duration_ms > 1000.0 {
            issues.push(format!(
                "operation '{}' averaging {:.0}ms",
                query.name, query.avg_duration_ms
            ));
        }
    }
    issues
}

/// Static advice rules keyed off the same aggregates the report shows.
pub fn recommendations(
    avg_query_time_ms: f64,
    error_rate: f64,
    memory_pressure: f64,
) -> Vec<String> {
    let mut out = Vec::new();
    if avg_query_time_ms > 500.0 {
        out.push(
            "average query time above 500ms: review indexes on the hottest tables".to_string(),
        );
    }
    if error_rate > 0.02 {
        out.push("error rate above 2%: review error handling around failing operations".to_string());
    }
    if memory_pressure > 0.80 {
        out.push("memory pressure above 80%: investigate for leaks or shrink caches".to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::health::{ProbeStatus, HealthStatus};

    fn healthy() -> HealthStatus {
        HealthStatus::combine(
            ProbeStatus {
                status: ProbeState::Healthy,
                response_time_ms: Some(5),
                message: "ok".into(),
            },
            ProbeStatus {
                status: ProbeState::Healthy,
                response_time_ms: None,
                message: "ok".into(),
            },
            ProbeStatus {
                status: ProbeState::Healthy,
                response_time_ms: None,
                message: "ok".into(),
            },
        )
    }

    fn query(name: &str, avg: f64) -> QueryReport {
        QueryReport {
            name: name.into(),
            total_calls: 10,
            success_count: 10,
            error_count: 0,
            avg_duration_ms: avg,
            max_duration_ms: avg as u64,
            min_duration_ms: Some(1),
            error_rate: 0.0,
        }
    }

    #[test]
    fn quiet_system_has_no_issues_or_advice() {
        assert!(top_issues(&healthy(), 0.0, &[query("fast", 20.0)]).is_empty());
        assert!(recommendations(20.0, 0.0, 0.3).is_empty());
    }

    #[test]
    fn slow_operations_are_flagged() {
        let issues = top_issues(&healthy(), 0.0, &[query("slow", 1500.0)]);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("slow"));
    }

    #[test]
    fn each_rule_fires_independently() {
        let advice = recommendations(600.0, 0.03, 0.85);
        assert_eq!(advice.len(), 3);
    }
}
