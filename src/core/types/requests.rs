//! Request types
//!
//! Inbound OpenAI-shaped bodies are deserialized into [`ChatCompletionRequest`]
//! or [`EmbeddingRequest`] and then normalized into a [`DispatchRequest`], the
//! only request shape the engine sees.

use super::message::ChatMessage;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Generation options forwarded to the provider (`temperature`, `max_tokens`, ...)
///
/// A `BTreeMap` keeps top-level keys sorted; nested objects are sorted again
/// when the cache fingerprint is computed.
pub type GenerationOptions = BTreeMap<String, Value>;

/// Which upstream endpoint a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// Chat completion
    Chat,
    /// Embedding generation
    Embedding,
}

impl RequestKind {
    /// Upstream path segment for OpenAI-shaped providers
    pub fn path(&self) -> &'static str {
        match self {
            RequestKind::Chat => "chat/completions",
            RequestKind::Embedding => "embeddings",
        }
    }
}

/// Chat completion request body as clients send it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Client-facing model name; empty resolves to the default mapping
    #[serde(default)]
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub stream: Option<bool>,
    /// Everything else the client sent
    #[serde(flatten)]
    pub options: GenerationOptions,
}

/// Embedding request body as clients send it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    #[serde(default)]
    pub model: String,
    /// A string, an array of strings or an array of token arrays
    pub input: Value,
    #[serde(flatten)]
    pub options: GenerationOptions,
}

/// Normalized request handed to the dispatch engine
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRequest {
    /// Client-requested model name
    pub model: String,
    pub kind: RequestKind,
    /// Ordered chat messages; empty for embeddings
    pub messages: Vec<ChatMessage>,
    /// Embedding input; `None` for chat
    pub input: Option<Value>,
    pub stream: bool,
    pub options: GenerationOptions,
}

impl DispatchRequest {
    /// Non-streaming chat request
    pub fn chat(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            kind: RequestKind::Chat,
            messages,
            input: None,
            stream: false,
            options: GenerationOptions::new(),
        }
    }

    /// Embedding request
    pub fn embedding(model: impl Into<String>, input: Value) -> Self {
        Self {
            model: model.into(),
            kind: RequestKind::Embedding,
            messages: Vec::new(),
            input: Some(input),
            stream: false,
            options: GenerationOptions::new(),
        }
    }

    /// Builder: request a streamed response
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Builder: add a generation option
    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// Reject requests that can never succeed upstream
    pub fn validate(&self) -> Result<(), String> {
        match self.kind {
            RequestKind::Chat => {
                if self.messages.is_empty() {
                    return Err("messages must not be empty".to_string());
                }
            }
            RequestKind::Embedding => {
                if self.stream {
                    return Err("embeddings cannot be streamed".to_string());
                }
                match &self.input {
                    None | Some(Value::Null) => {
                        return Err("input must not be empty".to_string());
                    }
                    Some(Value::String(s)) if s.is_empty() => {
                        return Err("input must not be empty".to_string());
                    }
                    Some(Value::Array(items)) if items.is_empty() => {
                        return Err("input must not be empty".to_string());
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

impl From<ChatCompletionRequest> for DispatchRequest {
    fn from(request: ChatCompletionRequest) -> Self {
        Self {
            model: request.model,
            kind: RequestKind::Chat,
            messages: request.messages,
            input: None,
            stream: request.stream.unwrap_or(false),
            options: request.options,
        }
    }
}

impl From<EmbeddingRequest> for DispatchRequest {
    fn from(request: EmbeddingRequest) -> Self {
        Self {
            model: request.model,
            kind: RequestKind::Embedding,
            messages: Vec::new(),
            input: Some(request.input),
            stream: false,
            options: request.options,
        }
    }
}
