//! Optional on-disk snapshots of raw and processed data, for debugging.
//!
//! Failures are logged and swallowed; snapshots never affect a response.

use std::path::{Path, PathBuf};

use crate::models::{HistoryRecord, MetricType, Period};

#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    root: PathBuf,
}

impl SnapshotWriter {
    // ---
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `{root}/raw-{type}-{period}/{code}.json`
    pub fn raw_path(&self, metric: MetricType, period: Period, code: &str) -> PathBuf {
        self.root
            .join(format!("raw-{}-{}", metric, period))
            .join(format!("{}.json", code))
    }

    /// `{root}/processed-{period}/{code}.json`
    pub fn processed_path(&self, period: Period, code: &str) -> PathBuf {
        self.root
            .join(format!("processed-{}", period))
            .join(format!("{}.json", code))
    }

    pub async fn write_raw(&self, metric: MetricType, period: Period, code: &str, body: &str) {
        // ---
        write_file(&self.raw_path(metric, period, code), body.as_bytes()).await;
    }

    pub async fn write_processed(&self, period: Period, code: &str, records: &[HistoryRecord]) {
        // ---
        match serde_json::to_string_pretty(records) {
            Ok(json) => write_file(&self.processed_path(period, code), json.as_bytes()).await,
            Err(e) => tracing::warn!("Failed to serialize snapshot for {}: {}", code, e),
        }
    }
}

async fn write_file(path: &Path, contents: &[u8]) {
    // ---
    if let Some(dir) = path.parent() {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            tracing::warn!("Failed to create snapshot dir {}: {}", dir.display(), e);
            return;
        }
    }

    match tokio::fs::write(path, contents).await {
        Ok(()) => tracing::debug!("Wrote snapshot {}", path.display()),
        Err(e) => tracing::warn!("Failed to write snapshot {}: {}", path.display(), e),
    }
}
