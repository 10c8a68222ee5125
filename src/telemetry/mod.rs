//! Telemetry instrumentation for the startup cache
//!
//! What the cache records:
//!
//! | Event | Channel | Name |
//! |-------|---------|------|
//! | Successful save | scalar | `extensions.startupCache.write_byteLength` |
//! | Failed load | keyed scalar (+1) | `extensions.startupCache.read_errors` |
//! | Any load | metric | `extensions.startup_cache_load_time` |
//! | Any load | scalar (legacy mirror) | `extensions.startupCache.load_time` |
//!
//! Sinks are write-only and infallible from the caller's point of view.
//! Nothing recorded here can change the outcome of a cache operation.

mod jsonl;
mod sink;

pub use jsonl::JsonLinesSink;
pub use sink::{FanoutSink, MemorySink, NoopSink, Recorded, TracingSink};

use crate::config::schema::{TelemetryConfig, TelemetrySinkKind};
use crate::config::ConfigManager;
use std::sync::Arc;
use std::time::Duration;

/// Byte length of the last successful save
pub const WRITE_BYTE_LENGTH: &str = "extensions.startupCache.write_byteLength";

/// Read failures keyed by classification
pub const READ_ERRORS: &str = "extensions.startupCache.read_errors";

/// Load duration, milliseconds
pub const LOAD_TIME_METRIC: &str = "extensions.startup_cache_load_time";

/// Legacy mirror of [`LOAD_TIME_METRIC`]
pub const LOAD_TIME_SCALAR: &str = "extensions.startupCache.load_time";

/// Destination for recorded values
pub trait TelemetrySink: Send + Sync {
    /// Set a scalar to `value`
    fn record_scalar(&self, name: &str, value: u64);

    /// Add `count` to the scalar stored under `key`
    fn record_keyed_scalar(&self, name: &str, key: &str, count: u64);

    /// Set a metric to `value`
    fn record_metric(&self, name: &str, value: u64);
}

/// Cache-specific recording on top of a sink
#[derive(Clone)]
pub struct Telemetry {
    sink: Arc<dyn TelemetrySink>,
}

impl Telemetry {
    pub fn new(sink: Arc<dyn TelemetrySink>) -> Self {
        Self { sink }
    }

    /// Telemetry that records nothing
    pub fn noop() -> Self {
        Self::new(Arc::new(NoopSink))
    }

    /// Build the sink selected in configuration
    pub fn from_config(config: &TelemetryConfig) -> Self {
        match config.sink {
            TelemetrySinkKind::Log => Self::new(Arc::new(TracingSink)),
            TelemetrySinkKind::Jsonl => {
                let path = config
                    .path
                    .clone()
                    .unwrap_or_else(ConfigManager::telemetry_log_path);
                Self::new(Arc::new(JsonLinesSink::new(path)))
            }
            TelemetrySinkKind::Disabled => Self::noop(),
        }
    }

    /// Underlying sink
    pub fn sink(&self) -> Arc<dyn TelemetrySink> {
        Arc::clone(&self.sink)
    }

    /// Record the size of a blob that was written
    pub fn record_write_size(&self, bytes: u64) {
        self.sink.record_scalar(WRITE_BYTE_LENGTH, bytes);
    }

    /// Count one read failure under its classification key
    pub fn record_read_error(&self, key: &str) {
        self.sink.record_keyed_scalar(READ_ERRORS, key, 1);
    }

    /// Record a load duration on the metric and its legacy mirror
    ///
    /// Both channels receive the same value. Returns that value.
    pub fn record_duration(&self, elapsed: Duration) -> u64 {
        let millis = duration_millis(elapsed);
        self.sink.record_metric(LOAD_TIME_METRIC, millis);
        self.sink.record_scalar(LOAD_TIME_SCALAR, millis);
        millis
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::noop()
    }
}

impl std::fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Telemetry").finish_non_exhaustive()
    }
}

/// Whole milliseconds, never below 1 so a completed load is always visible
fn duration_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis())
        .unwrap_or(u64::MAX)
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_fans_out_identically() {
        let sink = Arc::new(MemorySink::new());
        let telemetry = Telemetry::new(sink.clone());

        let recorded = telemetry.record_duration(Duration::from_millis(17));

        assert_eq!(recorded, 17);
        assert_eq!(sink.metric(LOAD_TIME_METRIC), Some(17));
        assert_eq!(sink.scalar(LOAD_TIME_SCALAR), Some(17));
    }

    #[test]
    fn sub_millisecond_duration_is_positive() {
        let sink = Arc::new(MemorySink::new());
        let telemetry = Telemetry::new(sink.clone());

        telemetry.record_duration(Duration::from_micros(80));

        assert_eq!(sink.metric(LOAD_TIME_METRIC), Some(1));
        assert_eq!(sink.scalar(LOAD_TIME_SCALAR), Some(1));
    }

    #[test]
    fn read_errors_accumulate_by_key() {
        let sink = Arc::new(MemorySink::new());
        let telemetry = Telemetry::new(sink.clone());

        telemetry.record_read_error("NotFoundError");
        telemetry.record_read_error("NotFoundError");
        telemetry.record_read_error("DecodeError");

        let errors = sink.keyed_scalar(READ_ERRORS);
        assert_eq!(errors.get("NotFoundError"), Some(&2));
        assert_eq!(errors.get("DecodeError"), Some(&1));
    }

    #[test]
    fn disabled_config_records_nothing() {
        let config = TelemetryConfig {
            sink: TelemetrySinkKind::Disabled,
            path: None,
        };
        // Must not panic or touch the filesystem
        Telemetry::from_config(&config).record_write_size(10);
    }
}
