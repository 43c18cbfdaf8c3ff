//! LLM call observation for tracevine.
//!
//! Bridges a chat-completion client into any
//! [`ObservationProvider`](tracevine_core::ObservationProvider):
//! [`ChatObserver::before_request`] opens a span and deposits it in the call
//! context, [`ChatObserver::after_response`] closes it for blocking calls,
//! and [`ChatObserver::wrap_stream`] substitutes a pass-through stream that
//! closes it when the chunks run out. Observation is strictly side-channel:
//! sink failures never reach the LLM call.

mod hooks;
mod stream;
mod types;

pub use hooks::{ChatObserver, LLM_SPAN_NAME};
pub use stream::{ChatCompletionStream, ObservedStream};
pub use types::{
    ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, Choice, ChunkChoice,
    Delta, LlmCallInfo, LlmError, Message, Role,
};

pub use tracevine_core::TokenUsage;
