//! Embeddings endpoint

use super::{caller_identity, dispatch};
use crate::core::types::{DispatchRequest, EmbeddingRequest};
use crate::server::state::AppState;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use tracing::info;

/// Embeddings endpoint
///
/// OpenAI-compatible embeddings API.
pub async fn embeddings(
    state: web::Data<AppState>,
    req: HttpRequest,
    request: web::Json<EmbeddingRequest>,
) -> ActixResult<HttpResponse> {
    let request = DispatchRequest::from(request.into_inner());
    info!(model = %request.model, "Embedding request");

    let caller = caller_identity(&req);
    Ok(dispatch(&state, &caller, request).await)
}
