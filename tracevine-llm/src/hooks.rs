use std::sync::Arc;

use serde_json::Value;
use tracevine_core::{CallContext, EndOptions, ObservationProvider, SpanKind, SpanOptions};

use crate::{
    ChatCompletionRequest, ChatCompletionResponse, ChatCompletionStream, LlmCallInfo, LlmError,
    ObservedStream,
};

/// Span name used for chat-completion calls.
pub const LLM_SPAN_NAME: &str = "llm-completion";

/// Bridges a chat-completion client into an [`ObservationProvider`].
///
/// For every call the client fires `before_request`, then either
/// `after_response` (blocking) or `wrap_stream` (streaming); exactly one of
/// those paths ends the span. Every sink failure is swallowed here — the
/// wrapped LLM call must not notice observation at all.
pub struct ChatObserver {
    provider: Arc<dyn ObservationProvider>,
}

impl ChatObserver {
    pub fn new(provider: Arc<dyn ObservationProvider>) -> Self {
        Self { provider }
    }

    /// Open a span for an outgoing request and return the context to thread
    /// through the rest of the call. If the sink refuses the span, the
    /// original context comes back and the call proceeds unobserved.
    pub fn before_request(
        &self,
        ctx: &CallContext,
        info: &LlmCallInfo,
        request: &ChatCompletionRequest,
    ) -> CallContext {
        let input = serde_json::to_value(&request.messages).unwrap_or(Value::Null);
        let options = SpanOptions {
            kind: SpanKind::Llm,
            model: Some(request.model.clone()),
            provider: Some(info.provider.clone()),
            input: Some(input),
        };
        match self.provider.start_span(ctx, LLM_SPAN_NAME, options) {
            Ok(span) => ctx.with_span(span),
            Err(error) => {
                tracing::debug!(provider = %info.provider, error = %error,
                    "start_span failed, call proceeds unobserved");
                ctx.clone()
            }
        }
    }

    /// Close the span for a blocking call.
    ///
    /// An errored call has no semantic output: the span ends with the error
    /// and any partial response is discarded. On success the first choice
    /// becomes the span output and usage is recorded even when the backend
    /// reported none (all-zero counters).
    pub fn after_response(
        &self,
        ctx: &CallContext,
        response: Option<&ChatCompletionResponse>,
        error: Option<&LlmError>,
    ) {
        let Some(span) = ctx.active_span() else {
            return;
        };
        if let Some(error) = error {
            if let Err(err) = span.end(EndOptions::with_error(error)) {
                tracing::debug!(error = %err, "failed to end span");
            }
            return;
        }
        if let Some(response) = response {
            if let Some(choice) = response.choices.first() {
                if let Err(err) = span.set_output(Value::String(choice.message.content.clone())) {
                    tracing::debug!(error = %err, "failed to record span output");
                }
            }
            if let Err(err) = span.set_usage(&response.usage) {
                tracing::debug!(error = %err, "failed to record span usage");
            }
        }
        if let Err(err) = span.end(EndOptions::default()) {
            tracing::debug!(error = %err, "failed to end span");
        }
    }

    /// Substitute an observing stream for a streaming call.
    ///
    /// Without an active span the stream is returned unchanged — no
    /// wrapping cost for unobserved calls.
    pub fn wrap_stream(&self, ctx: &CallContext, stream: ChatCompletionStream) -> ChatCompletionStream {
        match ctx.active_span() {
            Some(span) => Box::pin(ObservedStream::new(stream, Arc::clone(span))),
            None => stream,
        }
    }
}
