use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    CallContext, EndOptions, ObservationProvider, Span, SpanOptions, TokenUsage, TracevineError,
};

/// Span that accepts every write and records nothing.
pub struct NoopSpan;

impl Span for NoopSpan {
    fn set_output(&self, _output: Value) -> Result<(), TracevineError> {
        Ok(())
    }

    fn set_usage(&self, _usage: &TokenUsage) -> Result<(), TracevineError> {
        Ok(())
    }

    fn end(&self, _options: EndOptions) -> Result<(), TracevineError> {
        Ok(())
    }
}

/// The disabled path: callers keep their instrumentation, nothing is kept.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopProvider;

#[async_trait]
impl ObservationProvider for NoopProvider {
    fn start_span(
        &self,
        _ctx: &CallContext,
        _name: &str,
        _options: SpanOptions,
    ) -> Result<Arc<dyn Span>, TracevineError> {
        Ok(Arc::new(NoopSpan))
    }

    async fn flush(&self, _timeout: Duration) -> Result<(), TracevineError> {
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), TracevineError> {
        Ok(())
    }
}
