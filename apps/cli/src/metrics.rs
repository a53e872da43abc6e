//! Metric sink for the command line: log each counter and keep it for the
//! final JSON result.

use hightouch_sync::{InMemoryMetrics, MetricsSink};
use serde_json::{Map, Value};

#[derive(Debug, Default)]
pub struct LoggingMetrics {
    recorded: InMemoryMetrics,
}

impl LoggingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded counters as a JSON object, last value wins.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (name, value) in self.recorded.entries() {
            map.insert(name, Value::from(value));
        }
        Value::Object(map)
    }
}

impl MetricsSink for LoggingMetrics {
    fn counter(&self, name: &str, value: f64) {
        tracing::info!(metric = name, value, "counter");
        self.recorded.counter(name, value);
    }
}
