//! Daily JSONL files holding reduced metrics snapshots.
//!
//! Strictly an append-and-scan log: one `metrics-<YYYY-MM-DD>.jsonl` per
//! day, one JSON object per line, rotated aside once the day's file grows
//! past the size limit. Reads walk backward over the requested number of
//! days and skip malformed lines instead of failing the whole scan.

use std::path::PathBuf;

use chrono::{Days, Utc};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::snapshot::PersistedSnapshot;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("metrics history I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("metrics snapshot could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct JsonlHistory {
    dir: PathBuf,
    rotate_bytes: u64,
}

impl JsonlHistory {
    pub fn new(dir: impl Into<PathBuf>, rotate_bytes: u64) -> Self {
        Self {
            dir: dir.into(),
            rotate_bytes,
        }
    }

    fn day_path(&self, date: chrono::NaiveDate) -> PathBuf {
        self.dir.join(format!("metrics-{date}.jsonl"))
    }

    /// Appends one snapshot line to today's file, rotating it aside first
    /// when it has grown past the size limit.
    pub async fn append(&self, snapshot: &PersistedSnapshot) -> Result<(), HistoryError> {
        fs::create_dir_all(&self.dir).await?;
        let today = Utc::now().date_naive();
        let path = self.day_path(today);

        if let Ok(meta) = fs::metadata(&path).await
            && meta.len() > self.rotate_bytes
        {
            let rotated = self
                .dir
                .join(format!("metrics-{today}-{}.jsonl", Utc::now().format("%H%M%S")));
            fs::rename(&path, &rotated).await?;
        }

        let mut line = serde_json::to_string(snapshot)?;
        line.push('\n');
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }

    /// Reads up to `days` daily files backward from today and returns all
    /// parseable records sorted ascending by timestamp. Missing files and
    /// malformed lines are skipped.
    pub async fn read_days(&self, days: u32) -> Vec<PersistedSnapshot> {
        let today = Utc::now().date_naive();
        let mut records = Vec::new();
        for back in 0..days {
            let Some(date) = today.checked_sub_days(Days::new(back as u64)) else {
                break;
            };
            let Ok(content) = fs::read_to_string(self.day_path(date)).await else {
                continue;
            };
            for line in content.lines() {
                match serde_json::from_str::<PersistedSnapshot>(line) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        tracing::debug!(date = %date, error = %e, "skipping malformed history line");
                    }
                }
            }
        }
        records.sort_by_key(|r| r.timestamp);
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::health::ProbeState;
    use crate::domain::snapshot::{
        ConnectionCounts, HealthProjection, PerformanceProjection,
    };

    fn snapshot(queries: u64) -> PersistedSnapshot {
        PersistedSnapshot {
            timestamp: Utc::now(),
            health: HealthProjection {
                database: ProbeState::Healthy,
                supabase: ProbeState::Healthy,
                system: ProbeState::Healthy,
                overall: ProbeState::Healthy,
            },
            performance: PerformanceProjection {
                total_queries: queries,
                total_errors: 0,
                avg_query_time_ms: 12.5,
                error_rate: 0.0,
            },
            memory_pressure: 0.4,
            connections: ConnectionCounts {
                subscribers: 1,
                ws_clients: 0,
            },
        }
    }

    #[tokio::test]
    async fn append_then_read_round_trips_reduced_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let history = JsonlHistory::new(tmp.path(), 10 * 1024 * 1024);
        let written = snapshot(42);
        history.append(&written).await.unwrap();

        let read = history.read_days(1).await;
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].timestamp, written.timestamp);
        assert_eq!(read[0].health.overall, written.health.overall);
        assert_eq!(read[0].performance.total_queries, 42);
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let history = JsonlHistory::new(tmp.path(), 10 * 1024 * 1024);
        history.append(&snapshot(1)).await.unwrap();

        let today = Utc::now().date_naive();
        let path = tmp.path().join(format!("metrics-{today}.jsonl"));
        let mut content = std::fs::read_to_string(&path).unwrap();
        content.push_str("{this is not json\n");
        std::fs::write(&path, content).unwrap();
        history.append(&snapshot(2)).await.unwrap();

        let read = history.read_days(1).await;
        assert_eq!(read.len(), 2);
    }

    #[tokio::test]
    async fn oversized_file_rotates_aside() {
        let tmp = tempfile::tempdir().unwrap();
        // Tiny limit so the second append triggers rotation.
        let history = JsonlHistory::new(tmp.path(), 16);
        history.append(&snapshot(1)).await.unwrap();
        history.append(&snapshot(2)).await.unwrap();

        let files: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert!(files.len() >= 2, "expected a rotated file next to the live one: {files:?}");
    }

    #[tokio::test]
    async fn results_are_sorted_ascending() {
        let tmp = tempfile::tempdir().unwrap();
        let history = JsonlHistory::new(tmp.path(), 10 * 1024 * 1024);
        for n in 0..5 {
            history.append(&snapshot(n)).await.unwrap();
        }
        let read = history.read_days(1).await;
        assert!(read.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }
}
