use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use serde_json::Value;
use tracevine_core::{EndOptions, Span, TokenUsage};

use crate::{ChatCompletionChunk, LlmError};

/// Boxed chunk stream as produced by a chat-completion client.
pub type ChatCompletionStream = BoxStream<'static, Result<ChatCompletionChunk, LlmError>>;

/// Chunk stream that records output and usage on the active span.
///
/// Chunks pass through to the caller unchanged. The span is ended at most
/// once: when the inner stream finishes, when it yields a terminal error
/// (including cancellation), or when the wrapper is closed or dropped
/// before end-of-stream. After an early close, remaining chunks still pass
/// through but are no longer recorded.
pub struct ObservedStream {
    inner: ChatCompletionStream,
    span: Arc<dyn Span>,
    buffer: Vec<String>,
    usage: TokenUsage,
    terminated: bool,
}

impl ObservedStream {
    pub fn new(inner: ChatCompletionStream, span: Arc<dyn Span>) -> Self {
        Self {
            inner,
            span,
            buffer: Vec::new(),
            usage: TokenUsage::default(),
            terminated: false,
        }
    }

    /// Close the wrapper before end-of-stream, flushing what was seen so
    /// far. Closing an already-terminated wrapper is a no-op.
    pub fn close(&mut self) {
        self.finish();
    }

    fn observe(&mut self, chunk: &ChatCompletionChunk) {
        if self.terminated {
            return;
        }
        if let Some(content) = chunk
            .choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
        {
            if !content.is_empty() {
                self.buffer.push(content.to_string());
            }
        }
        if let Some(usage) = &chunk.usage {
            // totals, not increments: latest report wins
            self.usage = usage.clone();
        }
    }

    fn finish(&mut self) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        if let Err(err) = self.span.set_output(Value::String(self.buffer.concat())) {
            tracing::debug!(error = %err, "failed to record stream output");
        }
        if let Err(err) = self.span.set_usage(&self.usage) {
            tracing::debug!(error = %err, "failed to record stream usage");
        }
        if let Err(err) = self.span.end(EndOptions::default()) {
            tracing::debug!(error = %err, "failed to end stream span");
        }
    }

    fn finish_with_error(&mut self, error: &LlmError) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        if let Err(err) = self.span.end(EndOptions::with_error(error)) {
            tracing::debug!(error = %err, "failed to end stream span");
        }
    }
}

impl Stream for ObservedStream {
    type Item = Result<ChatCompletionChunk, LlmError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.inner.poll_next_unpin(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.observe(&chunk);
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(error))) => {
                this.finish_with_error(&error);
                Poll::Ready(Some(Err(error)))
            }
            Poll::Ready(None) => {
                this.finish();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for ObservedStream {
    fn drop(&mut self) {
        // an abandoned stream still closes its span
        self.finish();
    }
}
