//! Append-only category log files with daily rotation.
//!
//! One file per category under the log directory, created lazily on first
//! write. When the calendar date changes between writes, the current file
//! is renamed to `<category>.log.<date>` and a fresh one is started. The
//! rename is atomic on the filesystem but not coordinated with concurrent
//! writers of the same category outside this process.
//!
//! Every I/O failure here is swallowed after a tracing warning: the logger
//! must never become a failure mode for the code being observed.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

pub struct FileLogger {
    dir: PathBuf,
    /// Date of the last write per category, to detect rotation points.
    write_dates: Mutex<HashMap<String, NaiveDate>>,
}

impl FileLogger {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_dates: Mutex::new(HashMap::new()),
        }
    }

    /// Appends one JSON line to the category's log file, best-effort.
    pub async fn append(&self, category: &str, entry: &Value) {
        if let Err(e) = self.try_append(category, entry).await {
            tracing::warn!(category, error = %e, "log write failed, dropping entry");
        }
    }

    async fn try_append(&self, category: &str, entry: &Value) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!("{category}.log"));
        let today = Utc::now().date_naive();

        self.rotate_if_stale(category, &path, today).await?;

        let mut line = serde_json::to_string(entry).map_err(io::Error::other)?;
        line.push('\n');
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }

    /// Renames `<category>.log` to `<category>.log.<date>` when the last
    /// write to it happened on an earlier day. The previous day is taken
    /// from the in-memory map, falling back to the file's mtime so files
    /// left over from an earlier run still rotate.
    async fn rotate_if_stale(
        &self,
        category: &str,
        path: &Path,
        today: NaiveDate,
    ) -> io::Result<()> {
        let mut dates = self.write_dates.lock().await;
        let previous = match dates.get(category) {
            Some(date) => Some(*date),
            None => file_mtime_date(path).await,
        };
        if let Some(previous) = previous
            && previous < today
        {
            let rotated = self.dir.join(format!("{category}.log.{previous}"));
            match fs::rename(path, &rotated).await {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        dates.insert(category.to_string(), today);
        Ok(())
    }
}

async fn file_mtime_date(path: &Path) -> Option<NaiveDate> {
    let modified = fs::metadata(path).await.ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified).date_naive())
}
