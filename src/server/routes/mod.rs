//! HTTP route modules
//!
//! This module contains all HTTP route handlers organized by functionality.

pub mod admin;
pub mod ai;
pub mod health;

use crate::utils::error::GatewayError;
use actix_web::web;

/// JSON extractor settings; malformed bodies get the OpenAI error envelope
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| GatewayError::validation(err.to_string()).into())
}
