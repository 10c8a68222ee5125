//! JSON lines telemetry sink
//!
//! Appends one JSON object per record, e.g.
//! `{"timestamp":"..","kind":"scalar","name":"..","key":null,"value":123}`.

use super::TelemetrySink;
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

/// File-based sink that appends JSON lines
///
/// [`TelemetrySink`] is synchronous, so each record is appended with
/// blocking `std::fs` calls before the recording method returns. The cost is
/// one small append per record, a handful per cache load or save. Records
/// are on disk in call order by the time a load or save completes, which a
/// process about to exit relies on.
#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, dropping it on failure
    fn log(&self, kind: &str, name: &str, key: Option<&str>, value: u64) {
        let entry = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "kind": kind,
            "name": name,
            "key": key,
            "value": value,
        });

        let mut line = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize telemetry record: {}", e);
                return;
            }
        };
        line.push('\n');

        if let Err(e) = self.append(&line) {
            warn!(
                "Failed to write telemetry to {}: {}",
                self.path.display(),
                e
            );
        }
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.write_all(line.as_bytes())?;
        file.flush()
    }
}

impl TelemetrySink for JsonLinesSink {
    fn record_scalar(&self, name: &str, value: u64) {
        self.log("scalar", name, None, value);
    }

    fn record_keyed_scalar(&self, name: &str, key: &str, count: u64) {
        self.log("keyed_scalar", name, Some(key), count);
    }

    fn record_metric(&self, name: &str, value: u64) {
        self.log("metric", name, None, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn writes_json_line() {
        let dir = TempDir::new().unwrap();
        let sink = JsonLinesSink::new(dir.path().join("telemetry.jsonl"));

        sink.record_keyed_scalar("extensions.startupCache.read_errors", "NotFoundError", 1);

        let lines = read_lines(sink.path());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["kind"], "keyed_scalar");
        assert_eq!(lines[0]["key"], "NotFoundError");
        assert_eq!(lines[0]["value"], 1);
        assert!(lines[0]["timestamp"].is_string());
    }

    #[test]
    fn appends_multiple_lines() {
        let dir = TempDir::new().unwrap();
        let sink = JsonLinesSink::new(dir.path().join("logs").join("telemetry.jsonl"));

        sink.record_metric("m", 4);
        sink.record_scalar("s", 4);

        let lines = read_lines(sink.path());
        assert_eq!(lines.len(), 2);
        assert!(lines[1]["key"].is_null());
    }

    #[tokio::test]
    async fn record_is_on_disk_when_call_returns() {
        let dir = TempDir::new().unwrap();
        let sink = JsonLinesSink::new(dir.path().join("telemetry.jsonl"));

        sink.record_metric("extensions.startup_cache_load_time", 3);
        sink.record_scalar("extensions.startupCache.load_time", 3);

        let lines = read_lines(sink.path());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["kind"], "metric");
        assert_eq!(lines[1]["kind"], "scalar");
    }

    #[test]
    fn unwritable_path_is_silent() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();

        let sink = JsonLinesSink::new(blocker.join("telemetry.jsonl"));
        sink.record_scalar("s", 1);

        assert!(!sink.path().exists());
    }
}
