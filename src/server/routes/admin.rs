//! Admin API
//!
//! Mounted under `/admin` only when `server.admin_token` is set; every request
//! must carry `Authorization: Bearer <admin_token>`.

use crate::config::{ProviderConfig, default_api_key_header};
use crate::core::providers::ProviderKind;
use crate::server::state::AppState;
use crate::utils::error::{GatewayError, Result};
use crate::utils::logging::mask_secret;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

/// Configure admin routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/cache/clear", web::post().to(clear_cache))
            .route("/cache/stats", web::get().to(cache_stats))
            .route("/mappings", web::get().to(list_mappings))
            .route("/mappings/{name:.*}", web::put().to(set_mapping))
            .route("/mappings/{name:.*}", web::delete().to(remove_mapping))
            .route("/fallbacks", web::get().to(list_fallbacks))
            .route("/fallbacks/{model:.*}", web::put().to(set_fallback))
            .route("/fallbacks/{model:.*}", web::delete().to(remove_fallback))
            .route("/providers", web::get().to(list_providers))
            .route("/providers", web::post().to(register_provider))
            .route("/providers/{name}", web::delete().to(remove_provider)),
    );
}

/// Reject requests without the admin bearer token
fn authorize(state: &AppState, req: &HttpRequest) -> Result<()> {
    let expected = state
        .admin_token()
        .ok_or_else(|| GatewayError::unauthorized("admin API is disabled"))?;

    let presented = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    match presented {
        Some(token) if token == expected => Ok(()),
        Some(token) => {
            warn!(
                path = %req.path(),
                token = %mask_secret(token),
                "Rejected admin request with wrong token"
            );
            Err(GatewayError::unauthorized("invalid admin token"))
        }
        None => Err(GatewayError::unauthorized("missing admin token")),
    }
}

/// Body of `PUT /admin/mappings/{name}`
#[derive(Debug, Deserialize)]
pub struct MappingUpdate {
    pub target: String,
}

/// Body of `PUT /admin/fallbacks/{model}`
#[derive(Debug, Deserialize)]
pub struct FallbackUpdate {
    pub fallback: String,
}

/// Body of `POST /admin/providers`
#[derive(Debug, Deserialize)]
pub struct CustomProviderRequest {
    pub name: String,
    pub endpoint: String,
    #[serde(default)]
    pub api_keys: Vec<String>,
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
    /// Stripped from target models before the upstream call
    pub model_prefix: String,
    /// Defaults to the model prefix
    #[serde(default)]
    pub routes: Vec<String>,
}

impl From<CustomProviderRequest> for ProviderConfig {
    fn from(request: CustomProviderRequest) -> Self {
        let routes = if request.routes.is_empty() {
            vec![request.model_prefix.clone()]
        } else {
            request.routes
        };
        ProviderConfig {
            name: request.name,
            kind: ProviderKind::Custom,
            endpoint: request.endpoint,
            api_keys: request.api_keys,
            api_key_header: request.api_key_header,
            model_prefix: Some(request.model_prefix),
            routes,
        }
    }
}

async fn clear_cache(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse> {
    authorize(&state, &req)?;
    let cleared = state.engine.clear_cache();
    info!(cleared = cleared, "Cache cleared via admin API");
    Ok(HttpResponse::Ok().json(json!({ "cleared": cleared })))
}

async fn cache_stats(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse> {
    authorize(&state, &req)?;
    let stats = state.engine.cache_stats();
    Ok(HttpResponse::Ok().json(json!({
        "enabled": state.engine.cache().is_enabled(),
        "hit_rate": stats.hit_rate(),
        "stats": stats,
    })))
}

async fn list_mappings(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse> {
    authorize(&state, &req)?;
    Ok(HttpResponse::Ok().json(state.engine.mappings()))
}

async fn set_mapping(
    state: web::Data<AppState>,
    req: HttpRequest,
    name: web::Path<String>,
    body: web::Json<MappingUpdate>,
) -> Result<HttpResponse> {
    authorize(&state, &req)?;
    let name = name.into_inner();
    let previous = state.engine.set_mapping(&name, &body.target)?;
    Ok(HttpResponse::Ok().json(json!({
        "name": name,
        "target": body.target.trim(),
        "previous": previous,
    })))
}

async fn remove_mapping(
    state: web::Data<AppState>,
    req: HttpRequest,
    name: web::Path<String>,
) -> Result<HttpResponse> {
    authorize(&state, &req)?;
    let name = name.into_inner();
    let removed = state.engine.remove_mapping(&name)?;
    Ok(HttpResponse::Ok().json(json!({ "name": name, "removed": removed })))
}

async fn list_fallbacks(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse> {
    authorize(&state, &req)?;
    Ok(HttpResponse::Ok().json(state.engine.fallbacks()))
}

async fn set_fallback(
    state: web::Data<AppState>,
    req: HttpRequest,
    model: web::Path<String>,
    body: web::Json<FallbackUpdate>,
) -> Result<HttpResponse> {
    authorize(&state, &req)?;
    let model = model.into_inner();
    let previous = state.engine.set_fallback(&model, &body.fallback)?;
    Ok(HttpResponse::Ok().json(json!({
        "model": model,
        "fallback": body.fallback.trim(),
        "previous": previous,
    })))
}

async fn remove_fallback(
    state: web::Data<AppState>,
    req: HttpRequest,
    model: web::Path<String>,
) -> Result<HttpResponse> {
    authorize(&state, &req)?;
    let model = model.into_inner();
    let removed = state.engine.remove_fallback(&model)?;
    Ok(HttpResponse::Ok().json(json!({ "model": model, "removed": removed })))
}

async fn list_providers(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse> {
    authorize(&state, &req)?;
    Ok(HttpResponse::Ok().json(state.engine.providers()))
}

async fn register_provider(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CustomProviderRequest>,
) -> Result<HttpResponse> {
    authorize(&state, &req)?;
    let summary = state
        .engine
        .register_custom_provider(body.into_inner().into())?;
    Ok(HttpResponse::Created().json(summary))
}

async fn remove_provider(
    state: web::Data<AppState>,
    req: HttpRequest,
    name: web::Path<String>,
) -> Result<HttpResponse> {
    authorize(&state, &req)?;
    let summary = state.engine.remove_custom_provider(&name)?;
    Ok(HttpResponse::Ok().json(summary))
}
