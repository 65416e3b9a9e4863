//! Execution implementation for Router
//!
//! One explicit loop over `{retry_count, tried_models}`:
//! retry the current model until its budget is spent, then move to its
//! fallback unless that model was already tried.

use super::Router;
use super::execution::{calculate_retry_delay, is_retryable_error};
use super::fallback::ExecutionResult;
use crate::core::providers::{CallMode, ProviderClient, ProviderError, ProviderOutput};
use crate::core::types::{DispatchRequest, RequestKind};
use crate::utils::error::{GatewayError, Result};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Whether a provider can serve the request in the given mode
pub fn supports_request(provider: &dyn ProviderClient, request: &DispatchRequest, mode: CallMode) -> bool {
    let capabilities = provider.capabilities();
    if mode == CallMode::Stream && !capabilities.streaming {
        return false;
    }
    if request.kind == RequestKind::Embedding && !capabilities.embeddings {
        return false;
    }
    true
}

/// Attach the tried-model list once more than one model is involved
fn annotate(error: ProviderError, tried_models: Vec<String>) -> GatewayError {
    if tried_models.len() > 1 {
        GatewayError::FallbackExhausted {
            source: error,
            tried_models,
        }
    } else {
        error.into()
    }
}

impl Router {
    /// Execute a request with full retry and fallback support
    ///
    /// Configuration errors (unroutable model, empty key pool) and other
    /// non-retryable failures end the request immediately without spending
    /// retry budget. Dropping the returned future abandons the in-flight call
    /// and any pending backoff.
    pub async fn execute(
        &self,
        target_model: &str,
        request: &DispatchRequest,
        mode: CallMode,
    ) -> Result<ExecutionResult<ProviderOutput>> {
        let start = Instant::now();
        let max_retries = self.policy.max_retries.max(1);

        let mut current = target_model.to_string();
        let mut tried_models: Vec<String> = Vec::new();
        let mut total_attempts = 0u32;
        let mut last_error: Option<ProviderError> = None;

        loop {
            let route = match self.registry.lookup(&current) {
                Ok(route) => route,
                Err(err) => {
                    warn!(model = %current, error = %err, "Target model cannot be routed");
                    tried_models.push(current);
                    return Err(annotate(err, tried_models));
                }
            };
            let provider = route.provider;

            if !supports_request(provider.as_ref(), request, mode) {
                if tried_models.is_empty() {
                    let feature = if mode == CallMode::Stream {
                        "streaming"
                    } else {
                        "embeddings"
                    };
                    return Err(ProviderError::not_supported(provider.name(), feature).into());
                }
                // A fallback that cannot serve this mode is skipped, not attempted
                warn!(model = %current, provider = provider.name(), "Skipping fallback without required capability");
                tried_models.push(current.clone());
                match self.fallbacks.next(&current) {
                    Some(next) if !tried_models.contains(&next) => {
                        current = next;
                        continue;
                    }
                    _ => {
                        let error = last_error.unwrap_or_else(|| {
                            ProviderError::not_supported(provider.name(), "request mode")
                        });
                        return Err(GatewayError::FallbackExhausted {
                            source: error,
                            tried_models,
                        });
                    }
                }
            }

            let mut retry_count = 0u32;
            let exhausted_error = loop {
                total_attempts += 1;
                debug!(model = %current, provider = provider.name(), attempt = retry_count + 1, "Calling provider");

                match provider.call(&current, request, mode).await {
                    Ok(output) => {
                        let used_fallback = !tried_models.is_empty();
                        if used_fallback {
                            info!(
                                model = %current,
                                provider = provider.name(),
                                tried_models = ?tried_models,
                                "Request served by fallback model"
                            );
                        }
                        return Ok(ExecutionResult {
                            result: output,
                            model_used: current,
                            provider: provider.name().to_string(),
                            attempts: total_attempts,
                            used_fallback,
                            tried_models,
                            latency_us: start.elapsed().as_micros() as u64,
                        });
                    }
                    Err(err) if !is_retryable_error(&err) => {
                        warn!(model = %current, provider = provider.name(), error = %err, "Non-retryable provider failure");
                        tried_models.push(current);
                        return Err(annotate(err, tried_models));
                    }
                    Err(err) => {
                        retry_count += 1;
                        if retry_count >= max_retries {
                            warn!(
                                model = %current,
                                provider = provider.name(),
                                attempt = retry_count,
                                error = %err,
                                "Retries exhausted"
                            );
                            break err;
                        }

                        let delay = calculate_retry_delay(&self.policy, retry_count);
                        warn!(
                            model = %current,
                            provider = provider.name(),
                            attempt = retry_count,
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "Provider call failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            };

            tried_models.push(current.clone());
            match self.fallbacks.next(&current) {
                Some(next) if !tried_models.contains(&next) => {
                    info!(from = %current, to = %next, "Falling back to next model");
                    last_error = Some(exhausted_error);
                    current = next;
                }
                Some(next) => {
                    debug!(model = %next, "Fallback model already tried, stopping");
                    return Err(GatewayError::FallbackExhausted {
                        source: exhausted_error,
                        tried_models,
                    });
                }
                None => {
                    return Err(GatewayError::FallbackExhausted {
                        source: exhausted_error,
                        tried_models,
                    });
                }
            }
        }
    }
}
