//! Session-shaped chat provider (DashScope style)
//!
//! The upstream takes `{model, input: {messages}, parameters}` and answers with
//! `{output: {choices}, usage: {input_tokens, output_tokens}}`. It has no
//! streaming relay and no embeddings in this gateway.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::base::ApiKeyPool;
use super::base::connection_pool::extract_error_message;
use super::{
    CallMode, ProviderCapabilities, ProviderClient, ProviderDescriptor, ProviderError,
    ProviderOutput,
};
use crate::core::types::{
    ChatMessage, Choice, DispatchRequest, MessageRole, NormalizedResponse, RequestKind, Usage,
};

#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(default)]
    request_id: Option<String>,
    output: SessionOutput,
    #[serde(default)]
    usage: SessionUsage,
}

#[derive(Debug, Deserialize)]
struct SessionOutput {
    #[serde(default)]
    choices: Vec<SessionChoice>,
    /// Legacy `result_format: text` shape
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionChoice {
    message: SessionMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
    #[serde(default)]
    total_tokens: Option<u32>,
}

/// Session-shaped chat provider
#[derive(Debug, Clone)]
pub struct SessionProvider {
    descriptor: ProviderDescriptor,
    keys: ApiKeyPool,
    client: Client,
}

impl SessionProvider {
    pub fn new(descriptor: ProviderDescriptor, keys: ApiKeyPool, client: Client) -> Self {
        Self {
            descriptor,
            keys,
            client,
        }
    }

    /// Translate the message array into the session request shape
    pub fn build_body(upstream_model: &str, request: &DispatchRequest) -> Value {
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|message| json!({"role": message.role.to_string(), "content": message.text()}))
            .collect();

        let mut parameters: Map<String, Value> = request
            .options
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        parameters.insert(
            "result_format".to_string(),
            Value::String("message".to_string()),
        );

        json!({
            "model": upstream_model,
            "input": {"messages": messages},
            "parameters": parameters,
        })
    }

    fn normalize(&self, target_model: &str, raw: SessionResponse) -> Result<NormalizedResponse, ProviderError> {
        let mut response = NormalizedResponse::chat(target_model);
        if let Some(request_id) = raw.request_id {
            response.id = format!("chatcmpl-{}", request_id);
        }

        response.choices = if raw.output.choices.is_empty() {
            match raw.output.text {
                Some(text) => vec![Choice::assistant(0, text, raw.output.finish_reason)],
                None => {
                    return Err(ProviderError::response_parsing(
                        self.name(),
                        "response contained no choices",
                    ));
                }
            }
        } else {
            raw.output
                .choices
                .into_iter()
                .enumerate()
                .map(|(index, choice)| Choice {
                    index: index as u32,
                    message: ChatMessage::new(
                        MessageRole::Assistant,
                        choice.message.content.unwrap_or_default(),
                    ),
                    finish_reason: choice.finish_reason,
                })
                .collect()
        };

        let mut usage = Usage::new(raw.usage.input_tokens, raw.usage.output_tokens);
        if let Some(total) = raw.usage.total_tokens {
            usage.total_tokens = total;
        }
        response.usage = usage;

        Ok(response)
    }
}

#[async_trait]
impl ProviderClient for SessionProvider {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            streaming: false,
            embeddings: false,
        }
    }

    fn is_configured(&self) -> bool {
        !self.keys.is_empty()
    }

    async fn call(
        &self,
        target_model: &str,
        request: &DispatchRequest,
        mode: CallMode,
    ) -> Result<ProviderOutput, ProviderError> {
        let name = self.name();
        if mode == CallMode::Stream {
            return Err(ProviderError::not_supported(name, "streaming"));
        }
        if request.kind == RequestKind::Embedding {
            return Err(ProviderError::not_supported(name, "embeddings"));
        }

        let key = self.keys.next_key().ok_or_else(|| {
            ProviderError::configuration(name, format!("provider '{}' has no API keys", name))
        })?;

        let upstream_model = self.descriptor.upstream_model(target_model);
        let body = Self::build_body(upstream_model, request);
        let (header_name, header_value) = self.descriptor.auth_header(key);

        debug!(provider = name, model = upstream_model, "Sending session request");

        let response = self
            .client
            .post(&self.descriptor.endpoint)
            .header(header_name, header_value)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(name, &e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::api_error(
                name,
                status.as_u16(),
                extract_error_message(&text),
            ));
        }

        let raw: SessionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::response_parsing(name, e.to_string()))?;

        self.normalize(target_model, raw).map(ProviderOutput::Complete)
    }
}
