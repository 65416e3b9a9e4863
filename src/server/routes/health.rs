//! Health check endpoint

use crate::core::health_of;
use crate::server::state::AppState;
use actix_web::{HttpResponse, Result as ActixResult, web};
use tracing::debug;

/// Configure health check routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

/// Basic health check endpoint
///
/// Always answers 200 while the process is serving; a gateway without any
/// keyed provider reports `degraded`.
pub async fn health_check(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    debug!("Health check requested");
    Ok(HttpResponse::Ok().json(health_of(&state.engine)))
}
