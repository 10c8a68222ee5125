//! In-process telemetry sinks

use super::TelemetrySink;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

/// Everything a [`MemorySink`] has seen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Recorded {
    pub scalars: BTreeMap<String, u64>,
    pub keyed_scalars: BTreeMap<String, BTreeMap<String, u64>>,
    pub metrics: BTreeMap<String, u64>,
}

impl Recorded {
    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty() && self.keyed_scalars.is_empty() && self.metrics.is_empty()
    }
}

/// Keeps recorded values in memory for later inspection
#[derive(Debug, Default)]
pub struct MemorySink {
    recorded: Mutex<Recorded>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn snapshot(&self) -> Recorded {
        self.lock().clone()
    }

    /// Return everything recorded so far and start over
    pub fn take(&self) -> Recorded {
        std::mem::take(&mut *self.lock())
    }

    pub fn scalar(&self, name: &str) -> Option<u64> {
        self.lock().scalars.get(name).copied()
    }

    pub fn keyed_scalar(&self, name: &str) -> BTreeMap<String, u64> {
        self.lock()
            .keyed_scalars
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn metric(&self, name: &str) -> Option<u64> {
        self.lock().metrics.get(name).copied()
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TelemetrySink for MemorySink {
    fn record_scalar(&self, name: &str, value: u64) {
        self.lock().scalars.insert(name.to_string(), value);
    }

    fn record_keyed_scalar(&self, name: &str, key: &str, count: u64) {
        let mut recorded = self.lock();
        let slot = recorded
            .keyed_scalars
            .entry(name.to_string())
            .or_default()
            .entry(key.to_string())
            .or_insert(0);
        *slot = slot.saturating_add(count);
    }

    fn record_metric(&self, name: &str, value: u64) {
        self.lock().metrics.insert(name.to_string(), value);
    }
}

/// Emits every record as a structured tracing event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn record_scalar(&self, name: &str, value: u64) {
        info!(target: "startup_cache::telemetry", metric = name, value, "scalar");
    }

    fn record_keyed_scalar(&self, name: &str, key: &str, count: u64) {
        info!(target: "startup_cache::telemetry", metric = name, key, count, "keyed scalar");
    }

    fn record_metric(&self, name: &str, value: u64) {
        info!(target: "startup_cache::telemetry", metric = name, value, "metric");
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl TelemetrySink for NoopSink {
    fn record_scalar(&self, _name: &str, _value: u64) {}

    fn record_keyed_scalar(&self, _name: &str, _key: &str, _count: u64) {}

    fn record_metric(&self, _name: &str, _value: u64) {}
}

/// Forwards every record to each inner sink in order
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn TelemetrySink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn TelemetrySink>>) -> Self {
        Self { sinks }
    }
}

impl TelemetrySink for FanoutSink {
    fn record_scalar(&self, name: &str, value: u64) {
        for sink in &self.sinks {
            sink.record_scalar(name, value);
        }
    }

    fn record_keyed_scalar(&self, name: &str, key: &str, count: u64) {
        for sink in &self.sinks {
            sink.record_keyed_scalar(name, key, count);
        }
    }

    fn record_metric(&self, name: &str, value: u64) {
        for sink in &self.sinks {
            sink.record_metric(name, value);
        }
    }
}
