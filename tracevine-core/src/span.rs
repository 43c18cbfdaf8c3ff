use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::TracevineError;

/// Token consumption reported by an LLM backend.
///
/// Unreported counters are zero; in streaming mode the fields are cumulative
/// totals, not per-chunk increments.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SpanKind {
    #[default]
    Internal,
    Llm,
    Chain,
    Tool,
}

/// Options recognized at span start. Sinks ignore fields they have no use
/// for; unset fields are simply not recorded.
#[derive(Clone, Debug, Default)]
pub struct SpanOptions {
    pub kind: SpanKind,
    pub model: Option<String>,
    pub provider: Option<String>,
    pub input: Option<Value>,
}

/// Options recognized at span end.
#[derive(Clone, Debug, Default)]
pub struct EndOptions {
    /// Marks the span as failed. `None` means success.
    pub error: Option<String>,
    /// Explicit end timestamp; sinks assign their own when unset.
    pub end_time: Option<DateTime<Utc>>,
}

impl EndOptions {
    pub fn with_error(error: impl std::fmt::Display) -> Self {
        Self {
            error: Some(error.to_string()),
            end_time: None,
        }
    }

    pub fn at(end_time: DateTime<Utc>) -> Self {
        Self {
            error: None,
            end_time: Some(end_time),
        }
    }
}

/// Sink-owned handle for one observed operation.
///
/// A span is ended at most once. Every operation after `end` is a no-op
/// that returns `Ok(())`; writers never see an error from a closed span.
pub trait Span: Send + Sync {
    fn set_output(&self, output: Value) -> Result<(), TracevineError>;

    fn set_usage(&self, usage: &TokenUsage) -> Result<(), TracevineError>;

    fn end(&self, options: EndOptions) -> Result<(), TracevineError>;
}
