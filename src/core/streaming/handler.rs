//! Streaming relay implementation

use super::types::{Event, SseFramer};
use super::utils::{create_done_event, create_error_event};
use crate::core::providers::{ByteStream, ProviderError};
use crate::utils::error::Result;
use bytes::Bytes;
use futures::stream::StreamExt;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error};

/// What to do with one upstream event
#[derive(Debug, PartialEq)]
pub(crate) enum RelayAction {
    Forward(Event),
    /// Upstream sentinel; the relay sends its own
    Done,
    /// Upstream reported an error in-band
    Fail(ProviderError),
}

/// Streaming response handler
///
/// Forwards upstream SSE events to the client in arrival order. On a
/// mid-stream failure it emits exactly one `error` event followed by the
/// `[DONE]` sentinel and closes; it never retries once bytes were sent.
#[derive(Debug, Clone)]
pub struct StreamingHandler {
    /// Provider serving the stream, used in error classification
    pub(crate) provider: String,
    /// Client-facing model name written into forwarded chunks
    pub(crate) model_alias: Option<String>,
}

impl StreamingHandler {
    /// Create a new streaming handler
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model_alias: None,
        }
    }

    /// Rewrite the `model` field of forwarded chunks
    pub fn with_model_alias(mut self, model: impl Into<String>) -> Self {
        self.model_alias = Some(model.into());
        self
    }

    /// Relay a provider stream through a bounded channel
    ///
    /// The relay task stops and drops the upstream as soon as the receiving
    /// side goes away.
    pub fn create_sse_stream(self, upstream: ByteStream) -> ReceiverStream<Result<Bytes>> {
        let (tx, rx) = mpsc::channel(100);
        tokio::spawn(self.relay(upstream, tx));
        ReceiverStream::new(rx)
    }

    async fn relay(self, mut upstream: ByteStream, tx: mpsc::Sender<Result<Bytes>>) {
        let mut framer = SseFramer::new();
        let mut forwarded = 0usize;

        loop {
            let next = tokio::select! {
                _ = tx.closed() => {
                    debug!(provider = %self.provider, forwarded = forwarded, "Client disconnected, dropping upstream stream");
                    return;
                }
                next = upstream.next() => next,
            };

            let blocks = match next {
                Some(Ok(chunk)) => match framer.push(&chunk) {
                    Ok(blocks) => blocks,
                    Err(err) => {
                        let err = ProviderError::streaming(self.provider.as_str(), err.to_string());
                        self.fail(&tx, err, forwarded).await;
                        return;
                    }
                },
                Some(Err(err)) => {
                    self.fail(&tx, err, forwarded).await;
                    return;
                }
                None => break,
            };

            for block in blocks {
                match self.process_block(&block) {
                    Some(RelayAction::Forward(event)) => {
                        if tx.send(Ok(event.to_bytes())).await.is_err() {
                            return;
                        }
                        forwarded += 1;
                    }
                    Some(RelayAction::Done) => {
                        let _ = tx.send(Ok(create_done_event().to_bytes())).await;
                        return;
                    }
                    Some(RelayAction::Fail(err)) => {
                        self.fail(&tx, err, forwarded).await;
                        return;
                    }
                    None => {}
                }
            }
        }

        if let Some(rest) = framer.finish() {
            match self.process_block(&rest) {
                Some(RelayAction::Forward(event)) => {
                    if tx.send(Ok(event.to_bytes())).await.is_err() {
                        return;
                    }
                }
                Some(RelayAction::Fail(err)) => {
                    self.fail(&tx, err, forwarded).await;
                    return;
                }
                Some(RelayAction::Done) | None => {}
            }
        }

        debug!(provider = %self.provider, forwarded = forwarded, "Upstream stream completed");
        let _ = tx.send(Ok(create_done_event().to_bytes())).await;
    }

    /// One error event, then the sentinel
    async fn fail(&self, tx: &mpsc::Sender<Result<Bytes>>, err: ProviderError, forwarded: usize) {
        error!(provider = %self.provider, forwarded = forwarded, error = %err, "Provider stream failed");
        let err = match err {
            ProviderError::Streaming { .. } => err,
            other => ProviderError::streaming(self.provider.as_str(), other.to_string()),
        };
        if tx.send(Ok(create_error_event(err).to_bytes())).await.is_ok() {
            let _ = tx.send(Ok(create_done_event().to_bytes())).await;
        }
    }

    /// Decide what happens to one upstream event block
    pub(crate) fn process_block(&self, block: &str) -> Option<RelayAction> {
        let mut event = Event::parse_block(block)?;

        if event.is_done() {
            return Some(RelayAction::Done);
        }

        if let Ok(Value::Object(mut object)) = serde_json::from_str::<Value>(&event.data) {
            if let Some(error) = object.get("error") {
                let message = error
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| error.to_string());
                return Some(RelayAction::Fail(ProviderError::streaming(
                    self.provider.as_str(),
                    message,
                )));
            }

            if let Some(alias) = &self.model_alias {
                if object.contains_key("model") {
                    object.insert("model".to_string(), Value::String(alias.clone()));
                    event.data = Value::Object(object).to_string();
                }
            }
        }

        Some(RelayAction::Forward(event))
    }
}
