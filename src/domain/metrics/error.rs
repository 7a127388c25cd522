//! Error records and message-based severity classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum error records retained in memory.
pub const ERRORS_CAP: usize = 1000;

/// Coarse severity derived from the error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    /// Classifies an error message by substring heuristics.
    ///
    /// Connectivity failures outrank auth failures, which outrank
    /// validation noise; anything unrecognized is a warning.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("connection") || lower.contains("timeout") {
            Severity::Critical
        } else if lower.contains("auth") || lower.contains("permission") {
            Severity::Warning
        } else if lower.contains("validation") || lower.contains("invalid") {
            Severity::Info
        } else {
            Severity::Warning
        }
    }
}

/// One recorded error occurrence.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub timestamp: DateTime<Utc>,
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    pub severity: Severity,
}

impl ErrorRecord {
    pub fn new(kind: &str, message: &str, context: Option<Value>) -> Self {
        Self {
            timestamp: Utc::now(),
            kind: kind.to_string(),
            message: message.to_string(),
            context,
            severity: Severity::classify(message),
        }
    }
}
