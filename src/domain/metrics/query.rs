//! Per-operation query timing aggregates.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::ring::BoundedBuffer;

/// Maximum recent calls retained per operation name.
pub const RECENT_CALLS_CAP: usize = 100;

/// One observed execution of a named operation.
#[derive(Debug, Clone, Serialize)]
pub struct QueryCall {
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregated timing and success counters for one operation name.
///
/// Averages are always derived from the running sums so they cannot drift
/// from the counters.
#[derive(Debug, Clone)]
pub struct QueryMetric {
    pub total_calls: u64,
    pub total_duration_ms: u64,
    pub success_count: u64,
    pub error_count: u64,
    pub max_duration_ms: u64,
    pub min_duration_ms: Option<u64>,
    pub recent_calls: BoundedBuffer<QueryCall>,
}

impl Default for QueryMetric {
    fn default() -> Self {
        Self {
            total_calls: 0,
            total_duration_ms: 0,
            success_count: 0,
            error_count: 0,
            max_duration_ms: 0,
            min_duration_ms: None,
            recent_calls: BoundedBuffer::new(RECENT_CALLS_CAP),
        }
    }
}

impl QueryMetric {
    /// Folds one call into the aggregate and the recent-calls buffer.
    pub fn record(&mut self, call: QueryCall) {
        self.total_calls += 1;
        self.total_duration_ms += call.duration_ms;
        if call.success {
            self.success_count += 1;
        } else {
            self.error_count += 1;
        }
        self.max_duration_ms = self.max_duration_ms.max(call.duration_ms);
        self.min_duration_ms = Some(match self.min_duration_ms {
            Some(min) => min.min(call.duration_ms),
            None => call.duration_ms,
        });
        self.recent_calls.push(call);
    }

    /// Derived average, `0.0` before the first call.
    pub fn avg_duration_ms(&self) -> f64 {
        if self.total_calls == 0 {
            0.0
        } else {
            self.total_duration_ms as f64 / self.total_calls as f64
        }
    }

    /// Fraction of calls that failed, in `[0, 1]`.
    pub fn error_rate(&self) -> f64 {
        if self.total_calls == 0 {
            0.0
        } else {
            self.error_count as f64 / self.total_calls as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(duration_ms: u64, success: bool) -> QueryCall {
        QueryCall {
            timestamp: Utc::now(),
            duration_ms,
            success,
            context: None,
            error: (!success).then(|| "boom".to_string()),
        }
    }

    #[test]
    fn counters_stay_consistent() {
        let mut metric = QueryMetric::default();
        for n in 0..50 {
            metric.record(call(n * 10, n % 3 != 0));
        }
        assert_eq!(metric.total_calls, 50);
        assert_eq!(metric.total_calls, metric.success_count + metric.error_count);
        assert!(
            (metric.avg_duration_ms() - metric.total_duration_ms as f64 / 50.0).abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn min_max_track_extremes() {
        let mut metric = QueryMetric::default();
        metric.record(call(40, true));
        metric.record(call(5, true));
        metric.record(call(120, false));
        assert_eq!(metric.max_duration_ms, 120);
        assert_eq!(metric.min_duration_ms, Some(5));
    }

    #[test]
    fn recent_calls_never_exceed_cap() {
        let mut metric = QueryMetric::default();
        for n in 0..500 {
            metric.record(call(n, true));
        }
        assert_eq!(metric.recent_calls.len(), RECENT_CALLS_CAP);
        // Oldest evicted: the front is call 400.
        assert_eq!(metric.recent_calls.front().unwrap().duration_ms, 400);
    }

    #[test]
    fn empty_metric_has_zero_average_and_rate() {
        let metric = QueryMetric::default();
        assert_eq!(metric.avg_duration_ms(), 0.0);
        assert_eq!(metric.error_rate(), 0.0);
    }
}
