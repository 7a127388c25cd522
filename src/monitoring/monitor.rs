//! Operation timing, error capture, and the in-memory metric store.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::MonitoringSettings;
use crate::domain::metrics::{
    ErrorRecord, QueryCall, Severity, SystemSample, Trend,
};
use crate::infrastructure::logging::FileLogger;
use crate::infrastructure::system::SystemSampler;
use crate::monitoring::report::{
    ActivitySummary, PerformanceReport, QueryReport, ReportSummary, SYSTEM_TREND_THRESHOLD_PCT,
    SystemReport,
};
use crate::monitoring::store::{Alert, MetricStore};

/// Window for the recent-error-rate check.
const ERROR_RATE_WINDOW_MINUTES: i64 = 5;
/// Errors shown in the full report.
const REPORT_ERRORS_LIMIT: usize = 50;

/// Wraps operations for timing and error capture and owns the
/// [`MetricStore`].
///
/// Errors from wrapped operations are always re-thrown after recording:
/// monitoring stays transparent to business logic. Errors inside the
/// monitoring machinery itself (log writes, alert dispatch) are swallowed
/// locally.
pub struct PerformanceMonitor {
    store: Arc<RwLock<MetricStore>>,
    logger: Arc<FileLogger>,
    settings: MonitoringSettings,
    started_at: Instant,
}

impl PerformanceMonitor {
    pub fn new(logger: Arc<FileLogger>, settings: MonitoringSettings) -> Self {
        Self {
            store: Arc::new(RwLock::new(MetricStore::default())),
            logger,
            settings,
            started_at: Instant::now(),
        }
    }

    pub fn settings(&self) -> &MonitoringSettings {
        &self.settings
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Times `op`, records the outcome under `name`, and returns the
    /// operation's own result untouched. Failures are additionally
    /// recorded as `database_query` errors before being re-thrown.
    pub async fn monitor_query<T, E, F>(
        &self,
        name: &str,
        op: F,
        context: Option<Value>,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let start = Instant::now();
        let result = op.await;
        let duration = start.elapsed();

        match &result {
            Ok(_) => {
                self.record_query_metrics(name, duration, true, context, None)
                    .await;
            }
            Err(e) => {
                let message = e.to_string();
                self.record_query_metrics(name, duration, false, context.clone(), Some(message.as_str()))
                    .await;
                self.record_error("database_query", &message, context).await;
            }
        }
        result
    }

    /// Folds one observation into the aggregate for `name` and appends a
    /// `queries` log line. Fires the slow-query alert when the duration
    /// crosses the configured threshold, success or not.
    pub async fn record_query_metrics(
        &self,
        name: &str,
        duration: Duration,
        success: bool,
        context: Option<Value>,
        error: Option<&str>,
    ) {
        let duration_ms = duration.as_millis() as u64;
        let call = QueryCall {
            timestamp: Utc::now(),
            duration_ms,
            success,
            context: context.clone(),
            error: error.map(str::to_string),
        };
        self.store.write().await.record_query(name, call);

        self.logger
            .append(
                "queries",
                &json!({
                    "timestamp": Utc::now(),
                    "operation": name,
                    "duration_ms": duration_ms,
                    "success": success,
                    "error": error,
                    "context": context,
                }),
            )
            .await;

        if self.settings.slow_query_alerts && duration_ms > self.settings.slow_query_threshold_ms {
            warn!(operation = name, duration_ms, "slow query detected");
            self.send_alert(
                "slow_query",
                Severity::Warning,
                &format!("operation '{name}' took {duration_ms}ms"),
                Some(json!({"operation": name, "duration_ms": duration_ms})),
            )
            .await;
        }
    }

    /// Upserts the per-user activity aggregate. `None` maps to the shared
    /// "anonymous" bucket.
    pub async fn track_user_activity(
        &self,
        user_id: Option<&str>,
        action: &str,
        details: Option<Value>,
    ) {
        let user = user_id.unwrap_or("anonymous");
        self.store
            .write()
            .await
            .track_activity(user, action, details.clone());
        self.logger
            .append(
                "activity",
                &json!({
                    "timestamp": Utc::now(),
                    "user": user,
                    "action": action,
                    "details": details,
                }),
            )
            .await;
    }

    /// Records a classified error, re-evaluates the error rate, and raises
    /// an alert for critical severities.
    pub async fn record_error(&self, kind: &str, message: &str, context: Option<Value>) {
        let record = ErrorRecord::new(kind, message, context);
        let severity = record.severity;
        self.store.write().await.record_error(record);

        self.check_error_rate().await;

        self.logger
            .append(
                "errors",
                &json!({
                    "timestamp": Utc::now(),
                    "kind": kind,
                    "message": message,
                    "severity": severity,
                }),
            )
            .await;

        if severity == Severity::Critical {
            self.send_alert(
                "critical_error",
                Severity::Critical,
                message,
                Some(json!({"kind": kind})),
            )
            .await;
        }
    }

    /// Snapshots process and host resources into the bounded sample
    /// buffer. Memory-threshold alerting stays disabled here; the health
    /// probe applies its own thresholds and the samples feed trend
    /// reporting.
    pub async fn collect_system_metrics(&self, sampler: &SystemSampler) {
        let snapshot = sampler.sample();
        let sample = SystemSample {
            timestamp: Utc::now(),
            memory: snapshot.memory,
            uptime_secs: self.uptime().as_secs(),
            cpu_percent: snapshot.cpu_percent,
            load_average: snapshot.load_average,
        };
        let pressure = sample.memory.pressure();
        self.store.write().await.push_sample(sample);
        debug!(pressure, "system metrics sampled");
    }

    /// Recent errors over total calls; raises `high_error_rate` past the
    /// configured threshold.
    pub async fn check_error_rate(&self) {
        let rate = self
            .store
            .read()
            .await
            .recent_error_rate(ChronoDuration::minutes(ERROR_RATE_WINDOW_MINUTES));
        if rate > self.settings.high_error_rate_threshold {
            self.send_alert(
                "high_error_rate",
                Severity::Critical,
                &format!("error rate at {:.1}% over the last 5 minutes", rate * 100.0),
                Some(json!({"rate": rate})),
            )
            .await;
        }
    }

    /// Overall error rate, `[0, 1]`, `0.0` before the first call.
    pub async fn error_rate(&self) -> f64 {
        self.store.read().await.overall_error_rate()
    }

    /// Logs the alert and retains it in the bounded buffer. No outbound
    /// delivery.
    pub async fn send_alert(
        &self,
        kind: &str,
        severity: Severity,
        message: &str,
        data: Option<Value>,
    ) {
        warn!(kind, ?severity, message, "alert raised");
        let alert = Alert::new(kind, severity, message, data);
        self.logger
            .append(
                "alerts",
                &json!({
                    "timestamp": alert.created_at,
                    "id": alert.id,
                    "kind": alert.kind,
                    "severity": alert.severity,
                    "message": alert.message,
                    "data": alert.data,
                }),
            )
            .await;
        self.store.write().await.push_alert(alert);
    }

    pub async fn alerts(&self) -> Vec<Alert> {
        let store = self.store.read().await;
        store.alerts.iter_newest_first().cloned().collect()
    }

    pub async fn clear_alerts(&self) -> usize {
        let mut store = self.store.write().await;
        let cleared = store.alerts.len();
        store.alerts.clear();
        cleared
    }

    /// Pure read over the store; nothing is mutated or reset.
    pub async fn generate_report(&self) -> PerformanceReport {
        let store = self.store.read().await;
        PerformanceReport {
            generated_at: Utc::now(),
            uptime_secs: self.uptime().as_secs(),
            summary: summarize(&store),
            queries: query_reports(&store),
            errors: store
                .errors
                .iter_newest_first()
                .take(REPORT_ERRORS_LIMIT)
                .cloned()
                .collect(),
            user_activity: activity_summary(&store),
            system: system_report(&store),
        }
    }

    pub async fn query_reports(&self) -> Vec<QueryReport> {
        query_reports(&*self.store.read().await)
    }

    pub async fn recent_errors(&self, limit: usize) -> Vec<ErrorRecord> {
        let store = self.store.read().await;
        store.errors.iter_newest_first().take(limit).cloned().collect()
    }

    pub async fn activity_summary(&self) -> ActivitySummary {
        activity_summary(&*self.store.read().await)
    }

    pub async fn system_report(&self) -> SystemReport {
        system_report(&*self.store.read().await)
    }

    pub async fn summary(&self) -> ReportSummary {
        summarize(&*self.store.read().await)
    }

    /// Recent activity entries across all users, newest first.
    pub async fn recent_activity(&self, limit: usize) -> Vec<Value> {
        let store = self.store.read().await;
        let mut entries: Vec<(String, chrono::DateTime<Utc>, Value)> = store
            .users
            .iter()
            .flat_map(|(user, metric)| {
                metric.recent_activity.iter().map(move |entry| {
                    (
                        user.clone(),
                        entry.timestamp,
                        json!({
                            "user": user,
                            "timestamp": entry.timestamp,
                            "action": entry.action,
                            "details": entry.details,
                        }),
                    )
                })
            })
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.into_iter().take(limit).map(|(_, _, v)| v).collect()
    }
}

fn summarize(store: &MetricStore) -> ReportSummary {
    ReportSummary {
        total_queries: store.total_query_calls(),
        total_errors: store.errors.len() as u64,
        unique_users: store.users.len(),
        avg_query_time_ms: store.avg_query_time_ms(),
        error_rate: store.overall_error_rate(),
    }
}

fn query_reports(store: &MetricStore) -> Vec<QueryReport> {
    let mut reports: Vec<QueryReport> = store
        .queries
        .iter()
        .map(|(name, metric)| QueryReport {
            name: name.clone(),
            total_calls: metric.total_calls,
            success_count: metric.success_count,
            error_count: metric.error_count,
            avg_duration_ms: metric.avg_duration_ms(),
            max_duration_ms: metric.max_duration_ms,
            min_duration_ms: metric.min_duration_ms,
            error_rate: metric.error_rate(),
        })
        .collect();
    reports.sort_by(|a, b| b.total_calls.cmp(&a.total_calls));
    reports
}

fn activity_summary(store: &MetricStore) -> ActivitySummary {
    ActivitySummary {
        unique_users: store.users.len(),
        total_actions: store.total_actions(),
        total_sessions: store.total_sessions(),
    }
}

fn system_report(store: &MetricStore) -> SystemReport {
    let pressures: Vec<f64> = store.system.iter().map(|s| s.memory.pressure()).collect();
    let cpus: Vec<f64> = store.system.iter().map(|s| s.cpu_percent as f64).collect();
    SystemReport {
        sample_count: store.system.len(),
        latest: store.system.back().cloned(),
        memory_trend: Trend::of_series(&pressures, SYSTEM_TREND_THRESHOLD_PCT),
        cpu_trend: Trend::of_series(&cpus, SYSTEM_TREND_THRESHOLD_PCT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(tmp: &tempfile::TempDir) -> PerformanceMonitor {
        PerformanceMonitor::new(
            Arc::new(FileLogger::new(tmp.path().join("logs"))),
            MonitoringSettings::default(),
        )
    }

    #[tokio::test]
    async fn successful_query_is_aggregated() {
        let tmp = tempfile::tempdir().unwrap();
        let monitor = monitor(&tmp);

        let result: Result<u32, String> = monitor
            .monitor_query("fetch_meal_plan", async { Ok(7) }, None)
            .await;
        assert_eq!(result.unwrap(), 7);

        let report = monitor.generate_report().await;
        assert_eq!(report.summary.total_queries, 1);
        assert_eq!(report.summary.total_errors, 0);
        assert_eq!(report.queries[0].name, "fetch_meal_plan");
        assert_eq!(report.queries[0].success_count, 1);
    }

    #[tokio::test]
    async fn failing_query_records_and_rethrows() {
        let tmp = tempfile::tempdir().unwrap();
        let monitor = monitor(&tmp);

        let result: Result<u32, String> = monitor
            .monitor_query("test", async { Err("boom".to_string()) }, None)
            .await;
        assert_eq!(result.unwrap_err(), "boom");

        let report = monitor.generate_report().await;
        assert_eq!(report.queries[0].error_count, 1);
        let db_errors: Vec<_> = report
            .errors
            .iter()
            .filter(|e| e.kind == "database_query")
            .collect();
        assert_eq!(db_errors.len(), 1);
        assert_eq!(db_errors[0].message, "boom");
    }

    #[tokio::test]
    async fn slow_query_raises_alert_even_on_success() {
        let tmp = tempfile::tempdir().unwrap();
        let monitor = monitor(&tmp);

        monitor
            .record_query_metrics(
                "heavy_report",
                Duration::from_millis(2500),
                true,
                None,
                None,
            )
            .await;

        let alerts = monitor.alerts().await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, "slow_query");
    }

    #[tokio::test]
    async fn slow_query_alert_respects_config_toggle() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = MonitoringSettings {
            slow_query_alerts: false,
            ..MonitoringSettings::default()
        };
        let monitor = PerformanceMonitor::new(
            Arc::new(FileLogger::new(tmp.path().join("logs"))),
            settings,
        );
        monitor
            .record_query_metrics("heavy", Duration::from_millis(5000), true, None, None)
            .await;
        assert!(monitor.alerts().await.is_empty());
    }

    #[tokio::test]
    async fn critical_error_raises_alert() {
        let tmp = tempfile::tempdir().unwrap();
        let monitor = monitor(&tmp);
        monitor
            .record_error("database_query", "connection refused", None)
            .await;
        let alerts = monitor.alerts().await;
        assert!(alerts.iter().any(|a| a.kind == "critical_error"));
    }

    #[tokio::test]
    async fn high_error_rate_alert_fires_past_threshold() {
        let tmp = tempfile::tempdir().unwrap();
        let monitor = monitor(&tmp);

        // 10 calls, then a burst of recent errors: rate well above 5%.
        for _ in 0..10 {
            monitor
                .record_query_metrics("op", Duration::from_millis(5), true, None, None)
                .await;
        }
        monitor.record_error("database_query", "some failure", None).await;

        let alerts = monitor.alerts().await;
        assert!(alerts.iter().any(|a| a.kind == "high_error_rate"));
    }

    #[tokio::test]
    async fn report_invariants_hold_over_many_records() {
        let tmp = tempfile::tempdir().unwrap();
        let monitor = monitor(&tmp);
        for n in 0..40u64 {
            monitor
                .record_query_metrics(
                    "bulk",
                    Duration::from_millis(n),
                    n % 4 != 0,
                    None,
                    None,
                )
                .await;
        }
        let report = monitor.generate_report().await;
        let q = &report.queries[0];
        assert_eq!(q.total_calls, q.success_count + q.error_count);
        let expected_avg = (0..40u64).sum::<u64>() as f64 / 40.0;
        assert!((q.avg_duration_ms - expected_avg).abs() < 1e-9);
        assert!((0.0..=1.0).contains(&report.summary.error_rate));
    }

    #[tokio::test]
    async fn anonymous_activity_lands_in_shared_bucket() {
        let tmp = tempfile::tempdir().unwrap();
        let monitor = monitor(&tmp);
        monitor.track_user_activity(None, "browse_recipes", None).await;
        monitor
            .track_user_activity(Some("u-1"), "order_product", None)
            .await;
        let summary = monitor.activity_summary().await;
        assert_eq!(summary.unique_users, 2);
        assert_eq!(summary.total_actions, 2);
    }

    #[tokio::test]
    async fn clear_alerts_reports_count() {
        let tmp = tempfile::tempdir().unwrap();
        let monitor = monitor(&tmp);
        monitor
            .send_alert("test_alert", Severity::Info, "manual", None)
            .await;
        assert_eq!(monitor.clear_alerts().await, 1);
        assert!(monitor.alerts().await.is_empty());
    }
}
