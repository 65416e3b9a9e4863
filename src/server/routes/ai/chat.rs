//! Chat completions endpoint

use super::{caller_identity, dispatch};
use crate::core::types::{ChatCompletionRequest, DispatchRequest};
use crate::server::state::AppState;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use tracing::info;

/// Chat completions endpoint
///
/// OpenAI-compatible chat completions API that supports streaming and non-streaming responses.
pub async fn chat_completions(
    state: web::Data<AppState>,
    req: HttpRequest,
    request: web::Json<ChatCompletionRequest>,
) -> ActixResult<HttpResponse> {
    let request = DispatchRequest::from(request.into_inner());
    info!(
        model = %request.model,
        stream = request.stream,
        "Chat completion request"
    );

    let caller = caller_identity(&req);
    Ok(dispatch(&state, &caller, request).await)
}
