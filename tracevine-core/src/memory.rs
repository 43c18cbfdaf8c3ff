use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    CallContext, EndOptions, ObservationProvider, Span, SpanKind, SpanOptions, TokenUsage,
    TracevineError,
};

/// Span captured by [`InMemoryProvider`], visible once ended.
#[derive(Clone, Debug)]
pub struct FinishedSpan {
    pub id: Uuid,
    pub name: String,
    pub kind: SpanKind,
    pub model: Option<String>,
    pub provider: Option<String>,
    pub input: Option<Value>,
    pub output: Option<Value>,
    pub usage: Option<TokenUsage>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl FinishedSpan {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Sink that keeps finished spans in process memory, in end order.
///
/// Useful in tests and local development; nothing leaves the process.
#[derive(Clone, Default)]
pub struct InMemoryProvider {
    finished: Arc<Mutex<Vec<FinishedSpan>>>,
    shut_down: Arc<AtomicBool>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every span ended so far.
    pub fn finished_spans(&self) -> Vec<FinishedSpan> {
        self.finished
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ObservationProvider for InMemoryProvider {
    fn start_span(
        &self,
        _ctx: &CallContext,
        name: &str,
        options: SpanOptions,
    ) -> Result<Arc<dyn Span>, TracevineError> {
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(TracevineError::Shutdown);
        }
        let record = SpanRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            kind: options.kind,
            model: options.model,
            provider: options.provider,
            input: options.input,
            output: None,
            usage: None,
            started_at: Utc::now(),
            ended: false,
        };
        Ok(Arc::new(InMemorySpan {
            record: Mutex::new(record),
            sink: Arc::clone(&self.finished),
        }))
    }

    async fn flush(&self, _timeout: Duration) -> Result<(), TracevineError> {
        // nothing is queued; finished spans are already visible
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), TracevineError> {
        self.shut_down.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Debug)]
struct SpanRecord {
    id: Uuid,
    name: String,
    kind: SpanKind,
    model: Option<String>,
    provider: Option<String>,
    input: Option<Value>,
    output: Option<Value>,
    usage: Option<TokenUsage>,
    started_at: DateTime<Utc>,
    ended: bool,
}

struct InMemorySpan {
    record: Mutex<SpanRecord>,
    sink: Arc<Mutex<Vec<FinishedSpan>>>,
}

impl Span for InMemorySpan {
    fn set_output(&self, output: Value) -> Result<(), TracevineError> {
        let mut record = self.record.lock().unwrap_or_else(PoisonError::into_inner);
        if record.ended {
            return Ok(());
        }
        record.output = Some(output);
        Ok(())
    }

    fn set_usage(&self, usage: &TokenUsage) -> Result<(), TracevineError> {
        let mut record = self.record.lock().unwrap_or_else(PoisonError::into_inner);
        if record.ended {
            return Ok(());
        }
        record.usage = Some(usage.clone());
        Ok(())
    }

    fn end(&self, options: EndOptions) -> Result<(), TracevineError> {
        let mut record = self.record.lock().unwrap_or_else(PoisonError::into_inner);
        if record.ended {
            return Ok(());
        }
        record.ended = true;
        let finished = FinishedSpan {
            id: record.id,
            name: record.name.clone(),
            kind: record.kind.clone(),
            model: record.model.take(),
            provider: record.provider.take(),
            input: record.input.take(),
            output: record.output.take(),
            usage: record.usage.take(),
            error: options.error,
            started_at: record.started_at,
            ended_at: options.end_time.unwrap_or_else(Utc::now),
        };
        self.sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(finished);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde_json::json;

    fn start(provider: &InMemoryProvider) -> Arc<dyn Span> {
        provider
            .start_span(
                &CallContext::new(),
                "llm-completion",
                SpanOptions {
                    kind: SpanKind::Llm,
                    model: Some("gpt-4o".to_string()),
                    provider: Some("openai".to_string()),
                    input: Some(json!([{"role": "user", "content": "hi"}])),
                },
            )
            .expect("start_span")
    }

    #[test]
    fn records_span_fields_on_end() {
        let provider = InMemoryProvider::new();
        let span = start(&provider);
        span.set_output(json!("hello")).expect("set_output");
        span.set_usage(&TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 2,
            total_tokens: 12,
        })
        .expect("set_usage");
        span.end(EndOptions::default()).expect("end");

        let spans = provider.finished_spans();
        assert_eq!(spans.len(), 1);
        let finished = &spans[0];
        assert_eq!(finished.name, "llm-completion");
        assert_eq!(finished.kind, SpanKind::Llm);
        assert_eq!(finished.model.as_deref(), Some("gpt-4o"));
        assert_eq!(finished.provider.as_deref(), Some("openai"));
        assert_eq!(finished.output, Some(json!("hello")));
        assert_eq!(
            finished.usage.as_ref().map(|usage| usage.total_tokens),
            Some(12)
        );
        assert!(!finished.is_error());
    }

    #[test]
    fn end_is_recorded_at_most_once() {
        let provider = InMemoryProvider::new();
        let span = start(&provider);
        span.end(EndOptions::default()).expect("first end");
        span.end(EndOptions::with_error("late")).expect("second end");
        let spans = provider.finished_spans();
        assert_eq!(spans.len(), 1);
        assert!(!spans[0].is_error());
    }

    #[test]
    fn writes_after_end_are_noops() {
        let provider = InMemoryProvider::new();
        let span = start(&provider);
        span.end(EndOptions::default()).expect("end");
        span.set_output(json!("too late")).expect("set_output");
        span.set_usage(&TokenUsage::default()).expect("set_usage");
        assert_eq!(provider.finished_spans()[0].output, None);
    }

    #[test]
    fn explicit_end_time_is_honored() {
        let provider = InMemoryProvider::new();
        let span = start(&provider);
        let at = Utc::now() - chrono::Duration::seconds(30);
        span.end(EndOptions::at(at)).expect("end");
        assert_eq!(provider.finished_spans()[0].ended_at, at);
    }

    #[tokio::test]
    async fn shutdown_rejects_new_spans() {
        let provider = InMemoryProvider::new();
        provider.shutdown().await.expect("shutdown");
        let err = provider
            .start_span(&CallContext::new(), "llm-completion", SpanOptions::default())
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::Shutdown);
        provider
            .flush(Duration::from_secs(1))
            .await
            .expect("flush after shutdown is a no-op");
    }
}
