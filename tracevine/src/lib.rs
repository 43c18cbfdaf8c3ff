//! Umbrella crate for the tracevine workspace.
//!
//! Re-exports the provider-agnostic contracts from `tracevine-core` at the
//! root and, behind the `llm` feature (on by default), the chat-completion
//! hooks from `tracevine-llm` under [`llm`].
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use tracevine::llm::{ChatCompletionRequest, ChatObserver, LlmCallInfo, Message};
//! use tracevine::{CallContext, InMemoryProvider};
//!
//! let provider = InMemoryProvider::new();
//! let observer = ChatObserver::new(Arc::new(provider.clone()));
//!
//! let request = ChatCompletionRequest {
//!     model: "gpt-4o".to_string(),
//!     messages: vec![Message::user("hi")],
//!     temperature: None,
//!     max_tokens: None,
//! };
//! let info = LlmCallInfo::new("openai");
//! let ctx = observer.before_request(&CallContext::new(), &info, &request);
//! // ... run the call, then close the span:
//! observer.after_response(&ctx, None, None);
//! assert_eq!(provider.finished_spans().len(), 1);
//! ```

pub use tracevine_core::*;

#[cfg(feature = "llm")]
pub mod llm {
    pub use tracevine_llm::*;
}
