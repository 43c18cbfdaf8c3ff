use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::TracevineError;

/// Telemetry signal a record or export batch belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    Metrics,
    Traces,
    Logs,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Signal::Metrics => "metrics",
            Signal::Traces => "traces",
            Signal::Logs => "logs",
        };
        f.write_str(name)
    }
}

/// Options recognized when recording a metric sample.
#[derive(Clone, Debug, Default)]
pub struct MetricOptions {
    pub unit: Option<String>,
    pub description: Option<String>,
    pub attributes: BTreeMap<String, Value>,
}

/// Options recognized when emitting a log event.
#[derive(Clone, Debug, Default)]
pub struct EventOptions {
    pub severity: Option<String>,
    pub body: Option<Value>,
    pub attributes: BTreeMap<String, Value>,
}

pub trait MetricSink: Send + Sync {
    fn record_metric(
        &self,
        name: &str,
        value: f64,
        options: MetricOptions,
    ) -> Result<(), TracevineError>;
}

pub trait EventSink: Send + Sync {
    fn emit_event(&self, name: &str, options: EventOptions) -> Result<(), TracevineError>;
}
