//! OpenAI-shaped REST passthrough
//!
//! Forwards the client's body with the model swapped for the upstream id and
//! the caller's credentials swapped for a pooled provider key. Used for
//! OpenRouter-style aggregators and for admin-registered custom endpoints.

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{Map, Value};
use tracing::debug;

use super::base::connection_pool::extract_error_message;
use super::base::{ApiKeyPool, HttpClientPool};
use super::{
    CallMode, ProviderCapabilities, ProviderClient, ProviderDescriptor, ProviderError,
    ProviderOutput,
};
use crate::core::types::{DispatchRequest, NormalizedResponse, RequestKind};

/// REST passthrough provider
#[derive(Debug, Clone)]
pub struct PassthroughProvider {
    descriptor: ProviderDescriptor,
    keys: ApiKeyPool,
    http: HttpClientPool,
}

impl PassthroughProvider {
    pub fn new(descriptor: ProviderDescriptor, keys: ApiKeyPool, http: HttpClientPool) -> Self {
        Self {
            descriptor,
            keys,
            http,
        }
    }

    fn url(&self, kind: RequestKind) -> String {
        format!(
            "{}/{}",
            self.descriptor.endpoint.trim_end_matches('/'),
            kind.path()
        )
    }

    /// Upstream request body
    pub fn build_body(upstream_model: &str, request: &DispatchRequest, mode: CallMode) -> Value {
        let mut body: Map<String, Value> = request
            .options
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        body.insert("model".to_string(), Value::String(upstream_model.to_string()));
        match request.kind {
            RequestKind::Chat => {
                body.insert(
                    "messages".to_string(),
                    serde_json::to_value(&request.messages).unwrap_or(Value::Array(Vec::new())),
                );
                body.insert("stream".to_string(), Value::Bool(mode == CallMode::Stream));
            }
            RequestKind::Embedding => {
                body.insert(
                    "input".to_string(),
                    request.input.clone().unwrap_or(Value::Null),
                );
            }
        }

        Value::Object(body)
    }
}

#[async_trait]
impl ProviderClient for PassthroughProvider {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            streaming: true,
            embeddings: true,
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
        let key = self.keys.next_key().ok_or_else(|| {
            ProviderError::configuration(name, format!("provider '{}' has no API keys", name))
        })?;

        let upstream_model = self.descriptor.upstream_model(target_model);
        let body = Self::build_body(upstream_model, request, mode);
        let url = self.url(request.kind);
        let (header_name, header_value) = self.descriptor.auth_header(key);

        debug!(provider = name, url = %url, model = upstream_model, "Sending passthrough request");

        let response = match mode {
            CallMode::Complete => self
                .http
                .client()
                .post(&url)
                .header(header_name, header_value)
                .json(&body)
                .send()
                .await
                .map_err(|e| ProviderError::from_reqwest(name, &e))?,
            CallMode::Stream => {
                let send = self
                    .http
                    .stream_client()
                    .post(&url)
                    .header(header_name, header_value)
                    .json(&body)
                    .send();
                tokio::time::timeout(self.http.timeout(), send)
                    .await
                    .map_err(|_| {
                        ProviderError::timeout(name, "no response headers before the deadline")
                    })?
                    .map_err(|e| ProviderError::from_reqwest(name, &e))?
            }
        };

        let status = response.status();
        if !status.is_success() {
            let text = tokio::time::timeout(self.http.timeout(), response.text())
                .await
                .ok()
                .and_then(Result::ok)
                .unwrap_or_default();
            return Err(ProviderError::api_error(
                name,
                status.as_u16(),
                extract_error_message(&text),
            ));
        }

        match mode {
            CallMode::Stream => {
                let provider = name.to_string();
                let idle = self.http.idle_timeout();
                let stream = tokio_stream::StreamExt::timeout(response.bytes_stream(), idle).map(
                    move |chunk| match chunk {
                        Ok(chunk) => chunk
                            .map_err(|e| ProviderError::streaming(provider.as_str(), e.to_string())),
                        Err(_) => Err(ProviderError::streaming(
                            provider.as_str(),
                            format!("no data from upstream for {}s", idle.as_secs_f64()),
                        )),
                    },
                );
                Ok(ProviderOutput::Stream(Box::pin(stream)))
            }
            CallMode::Complete => {
                let mut parsed: NormalizedResponse = response
                    .json()
                    .await
                    .map_err(|e| ProviderError::response_parsing(name, e.to_string()))?;

                let object = match request.kind {
                    RequestKind::Chat => "chat.completion",
                    RequestKind::Embedding => "list",
                };
                if request.kind == RequestKind::Chat && parsed.choices.is_empty() {
                    return Err(ProviderError::response_parsing(
                        name,
                        "response contained no choices",
                    ));
                }
                parsed.fill_defaults(object);
                Ok(ProviderOutput::Complete(parsed))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::providers::ProviderKind;
    use crate::core::types::user_message;
    use serde_json::json;

    #[test]
    fn test_build_chat_body_swaps_model() {
        let request = DispatchRequest::chat("gpt-4", vec![user_message("hi")])
            .with_option("temperature", json!(0.5));

        let body =
            PassthroughProvider::build_body("deepseek/deepseek-chat", &request, CallMode::Stream);
        assert_eq!(body["model"], "deepseek/deepseek-chat");
        assert_eq!(body["temperature"], json!(0.5));
        assert_eq!(body["stream"], json!(true));
        assert_eq!(body["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_build_embedding_body() {
        let request = DispatchRequest::embedding("text-embedding", json!(["a"]));
        let body = PassthroughProvider::build_body("openai/text-embedding-3-small", &request, CallMode::Complete);
        assert_eq!(body["input"], json!(["a"]));
        assert!(body.get("messages").is_none());
        assert!(body.get("stream").is_none());
    }

    #[tokio::test]
    async fn test_empty_key_pool_fails_before_io() {
        let descriptor = ProviderDescriptor {
            name: "openrouter".to_string(),
            kind: ProviderKind::Passthrough,
            // Unroutable address: any I/O attempt would surface as a network error
            endpoint: "http://127.0.0.1:9".to_string(),
            api_key_header: "Authorization".to_string(),
            model_prefix: None,
            routes: vec![],
        };
        let provider = PassthroughProvider::new(
            descriptor,
            ApiKeyPool::default(),
            HttpClientPool::new().unwrap(),
        );
        let request = DispatchRequest::chat("gpt-4", vec![user_message("hi")]);

        let err = provider
            .call("deepseek/deepseek-chat", &request, CallMode::Complete)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Configuration { .. }));
        assert!(!provider.is_configured());
    }
}
