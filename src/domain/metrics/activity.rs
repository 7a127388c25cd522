//! Per-user activity aggregates.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::ring::BoundedBuffer;

/// Maximum recent activity entries retained per user.
pub const RECENT_ACTIVITY_CAP: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Activity counters for one user id ("anonymous" when unauthenticated).
#[derive(Debug, Clone)]
pub struct UserActivityMetric {
    pub total_actions: u64,
    pub sessions: HashSet<String>,
    pub recent_activity: BoundedBuffer<ActivityEntry>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl UserActivityMetric {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            total_actions: 0,
            sessions: HashSet::new(),
            recent_activity: BoundedBuffer::new(RECENT_ACTIVITY_CAP),
            first_seen: now,
            last_seen: now,
        }
    }

    /// Records one action; a `session_id` field in the details is added to
    /// the session set.
    pub fn record(&mut self, action: &str, details: Option<Value>) {
        let now = Utc::now();
        self.total_actions += 1;
        self.last_seen = now;
        if let Some(session) = details
            .as_ref()
            .and_then(|d| d.get("session_id"))
            .and_then(Value::as_str)
        {
            self.sessions.insert(session.to_string());
        }
        self.recent_activity.push(ActivityEntry {
            timestamp: now,
            action: action.to_string(),
            details,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sessions_deduplicate() {
        let mut metric = UserActivityMetric::new(Utc::now());
        metric.record("view_meal_plan", Some(json!({"session_id": "s1"})));
        metric.record("view_meal_plan", Some(json!({"session_id": "s1"})));
        metric.record("order_product", Some(json!({"session_id": "s2"})));
        assert_eq!(metric.total_actions, 3);
        assert_eq!(metric.sessions.len(), 2);
    }

    #[test]
    fn recent_activity_respects_cap() {
        let mut metric = UserActivityMetric::new(Utc::now());
        for n in 0..200 {
            metric.record("ping", Some(json!({"n": n})));
        }
        assert_eq!(metric.recent_activity.len(), RECENT_ACTIVITY_CAP);
        assert_eq!(
            metric.recent_activity.front().unwrap().details,
            Some(json!({"n": 150}))
        );
    }
}
