//! AI API endpoints (OpenAI compatible)
//!
//! This module provides OpenAI-compatible API endpoints for AI services.

mod chat;
mod context;
mod embeddings;
mod models;

pub use chat::chat_completions;
pub use context::{caller_identity, insert_dispatch_headers, insert_rate_limit_headers};
pub use embeddings::embeddings;
pub use models::list_models;

use crate::core::dispatcher::DispatchBody;
use crate::core::streaming::create_sse_response;
use crate::core::types::DispatchRequest;
use crate::server::state::AppState;
use crate::utils::error::GatewayError;
use actix_web::{HttpResponse, ResponseError, web};
use tracing::warn;

/// Configure AI API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1")
            // Chat completions
            .route("/chat/completions", web::post().to(chat_completions))
            // Embeddings
            .route("/embeddings", web::post().to(embeddings))
            // Models
            .route("/models", web::get().to(list_models)),
    );
}

/// Run a request through the engine and render the result
async fn dispatch(state: &AppState, caller: &str, request: DispatchRequest) -> HttpResponse {
    match state.engine.resolve_and_dispatch(caller, request).await {
        Ok(outcome) => {
            let mut response = match outcome.body {
                DispatchBody::Complete(body) => HttpResponse::Ok().json(body),
                DispatchBody::Stream(stream) => create_sse_response(stream),
            };
            insert_dispatch_headers(response.headers_mut(), &outcome.metadata);
            response
        }
        Err(err) => error_response(state, caller, err),
    }
}

/// Render an error; rate limit headers are attached whenever the caller has a bucket
fn error_response(state: &AppState, caller: &str, err: GatewayError) -> HttpResponse {
    warn!(error = %err, code = err.kind().code(), "Request failed");

    let mut response = err.error_response();
    if !matches!(err, GatewayError::RateLimit { .. }) {
        if let Some(status) = state.engine.rate_limit_status(caller) {
            insert_rate_limit_headers(response.headers_mut(), &status);
        }
    }
    response
}
