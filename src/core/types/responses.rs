//! Response types
//!
//! Every provider adapter produces a [`NormalizedResponse`], whatever shape the
//! upstream answered in.

use super::message::{ChatMessage, MessageRole};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Token usage statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl Usage {
    /// Build usage, deriving the total
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

/// A single completion choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl Choice {
    /// Assistant choice with plain-text content
    pub fn assistant(index: u32, content: impl Into<String>, finish_reason: Option<String>) -> Self {
        Self {
            index,
            message: ChatMessage::new(MessageRole::Assistant, content.into()),
            finish_reason,
        }
    }
}

/// A single embedding vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingData {
    #[serde(default = "default_embedding_object")]
    pub object: String,
    #[serde(default)]
    pub index: u32,
    /// Float array, or a base64 string when `encoding_format` asked for it
    pub embedding: Value,
}

fn default_embedding_object() -> String {
    "embedding".to_string()
}

/// Provider-independent response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<EmbeddingData>>,
    #[serde(default)]
    pub usage: Usage,
}

impl NormalizedResponse {
    /// Empty chat completion with a fresh id
    pub fn chat(model: impl Into<String>) -> Self {
        Self {
            id: format!("chatcmpl-{}", uuid::Uuid::new_v4().simple()),
            object: "chat.completion".to_string(),
            created: chrono::Utc::now().timestamp(),
            model: model.into(),
            choices: Vec::new(),
            data: None,
            usage: Usage::default(),
        }
    }

    /// Fill the fields some upstreams leave out
    pub fn fill_defaults(&mut self, object: &str) {
        if self.id.is_empty() {
            self.id = format!("chatcmpl-{}", uuid::Uuid::new_v4().simple());
        }
        if self.object.is_empty() {
            self.object = object.to_string();
        }
        if self.created == 0 {
            self.created = chrono::Utc::now().timestamp();
        }
        if self.usage.total_tokens == 0 {
            self.usage.total_tokens = self.usage.prompt_tokens + self.usage.completion_tokens;
        }
    }

    /// First choice's text, if any
    pub fn first_content(&self) -> Option<String> {
        self.choices.first().map(|choice| choice.message.text())
    }
}

/// Entry of `GET /v1/models`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub owned_by: String,
}

/// Body of `GET /v1/models`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelList {
    pub object: String,
    pub data: Vec<ModelInfo>,
}
