//! Model listing endpoint

use super::{caller_identity, insert_rate_limit_headers};
use crate::core::types::{ModelInfo, ModelList};
use crate::server::state::AppState;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use tracing::debug;

/// List client-visible models
///
/// These are the names of the mapping table, not the upstream ids they
/// resolve to. Listing does not consume rate-limit tokens.
pub async fn list_models(state: web::Data<AppState>, req: HttpRequest) -> ActixResult<HttpResponse> {
    debug!("Listing available models");

    let created = chrono::Utc::now().timestamp();
    let data = state
        .engine
        .client_models()
        .into_iter()
        .map(|id| ModelInfo {
            id,
            object: "model".to_string(),
            created,
            owned_by: "relay-gateway".to_string(),
        })
        .collect();

    let mut response = HttpResponse::Ok().json(ModelList {
        object: "list".to_string(),
        data,
    });
    if let Some(status) = state.engine.rate_limit_status(&caller_identity(&req)) {
        insert_rate_limit_headers(response.headers_mut(), &status);
    }
    Ok(response)
}
