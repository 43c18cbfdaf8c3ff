//! Provider-agnostic observability contracts for LLM and ML workloads.
//!
//! The crate defines the vocabulary a sink has to speak — spans with
//! start/end options, token usage, metric and event options, lifecycle
//! records — plus a no-op and an in-memory implementation. Concrete
//! backends (OTLP collectors, Langfuse, MLflow, ...) live in their own
//! crates and implement [`ObservationProvider`].

mod context;
mod error;
mod lifecycle;
mod memory;
mod noop;
mod provider;
mod span;
mod telemetry;

pub use context::CallContext;
pub use error::{ErrorKind, TracevineError};
pub use lifecycle::{
    Artifact, ArtifactStore, Experiment, ExperimentTracker, InMemoryTracker, ModelRegistry,
    ModelStage, ModelVersion, Run, RunStatus,
};
pub use memory::{FinishedSpan, InMemoryProvider};
pub use noop::{NoopProvider, NoopSpan};
pub use provider::{
    ObservationProvider, ProviderConfig, DEFAULT_BATCH_SIZE, DEFAULT_BATCH_TIMEOUT,
};
pub use span::{EndOptions, Span, SpanKind, SpanOptions, TokenUsage};
pub use telemetry::{EventOptions, EventSink, MetricOptions, MetricSink, Signal};
