use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracevine_core::TokenUsage;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Per-call descriptor the client exposes when it issues a request.
///
/// Read-only to the observation layer.
#[derive(Clone, Debug, Default)]
pub struct LlmCallInfo {
    /// Upstream vendor name, e.g. `"openai"`.
    pub provider: String,
    /// Routing metadata the client chose to expose.
    pub metadata: BTreeMap<String, Value>,
}

impl LlmCallInfo {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            metadata: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ChatCompletionResponse {
    pub model: String,
    pub choices: Vec<Choice>,
    /// Unreported counters deserialize to zero.
    #[serde(default)]
    pub usage: TokenUsage,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Choice {
    pub index: u32,
    pub message: Message,
    pub finish_reason: Option<String>,
}

/// Streamed delta (server-sent events).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub model: Option<String>,
    pub choices: Vec<ChunkChoice>,
    /// Cumulative totals, typically only on the final chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ChunkChoice {
    pub index: u32,
    #[serde(default)]
    pub delta: Delta,
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Delta {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Failure surfaced by the chat-completion client itself.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM provider failed: {0}")]
    Provider(String),
    #[error("response decode failed: {0}")]
    Decode(String),
    #[error("LLM call was cancelled")]
    Cancelled,
}
