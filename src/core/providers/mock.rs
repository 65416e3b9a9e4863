//! Scripted provider for unit tests

use super::{
    CallMode, ProviderCapabilities, ProviderClient, ProviderDescriptor, ProviderError,
    ProviderKind, ProviderOutput,
};
use crate::core::types::{Choice, DispatchRequest, NormalizedResponse, Usage};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

/// Provider that replays a script of failures, then succeeds
#[derive(Debug)]
pub struct MockProvider {
    descriptor: ProviderDescriptor,
    script: Mutex<VecDeque<ProviderError>>,
    calls: AtomicU32,
    capabilities: ProviderCapabilities,
    configured: bool,
    fail_forever: Option<ProviderError>,
}

impl MockProvider {
    pub fn new(name: &str, routes: &[&str]) -> Self {
        Self {
            descriptor: ProviderDescriptor {
                name: name.to_string(),
                kind: ProviderKind::Passthrough,
                endpoint: format!("http://{}.invalid", name),
                api_key_header: "Authorization".to_string(),
                model_prefix: None,
                routes: routes.iter().map(|r| r.to_string()).collect(),
            },
            script: Mutex::new(VecDeque::new()),
            calls: AtomicU32::new(0),
            capabilities: ProviderCapabilities {
                streaming: true,
                embeddings: true,
            },
            configured: true,
            fail_forever: None,
        }
    }

    /// Fail the next calls with these errors, in order
    pub fn failing_with(self, errors: Vec<ProviderError>) -> Self {
        *self.script.lock() = errors.into();
        self
    }

    /// Fail every call with this error
    pub fn always_failing(mut self, error: ProviderError) -> Self {
        self.fail_forever = Some(error);
        self
    }

    pub fn without_keys(mut self) -> Self {
        self.configured = false;
        self
    }

    pub fn with_capabilities(mut self, streaming: bool, embeddings: bool) -> Self {
        self.capabilities = ProviderCapabilities {
            streaming,
            embeddings,
        };
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderClient for MockProvider {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    fn capabilities(&self) -> ProviderCapabilities {
        self.capabilities
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn call(
        &self,
        target_model: &str,
        _request: &DispatchRequest,
        mode: CallMode,
    ) -> Result<ProviderOutput, ProviderError> {
        if !self.configured {
            return Err(ProviderError::configuration(self.name(), "no API keys"));
        }
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = &self.fail_forever {
            return Err(error.clone());
        }
        if let Some(error) = self.script.lock().pop_front() {
            return Err(error);
        }

        match mode {
            CallMode::Complete => {
                let mut response = NormalizedResponse::chat(target_model);
                response.choices = vec![Choice::assistant(
                    0,
                    format!("from {}", self.name()),
                    Some("stop".to_string()),
                )];
                response.usage = Usage::new(3, 2);
                Ok(ProviderOutput::Complete(response))
            }
            CallMode::Stream => {
                let chunks = vec![
                    Ok(Bytes::from_static(b"data: {\"n\":1}\n\n")),
                    Ok(Bytes::from_static(b"data: [DONE]\n\n")),
                ];
                Ok(ProviderOutput::Stream(Box::pin(futures::stream::iter(chunks))))
            }
        }
    }
}
