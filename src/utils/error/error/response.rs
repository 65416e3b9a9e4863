//! HTTP response handling for errors

use super::types::GatewayError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());

        if let GatewayError::RateLimit {
            limit,
            remaining,
            retry_after_secs,
            reset_at,
            ..
        } = self
        {
            builder
                .insert_header(("Retry-After", retry_after_secs.to_string()))
                .insert_header(("X-RateLimit-Limit", limit.to_string()))
                .insert_header(("X-RateLimit-Remaining", remaining.to_string()))
                .insert_header(("X-RateLimit-Reset", reset_at.to_string()));
        }

        builder.json(ErrorResponse::from_error(self))
    }
}

/// OpenAI-compatible error envelope
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tried_models: Option<Vec<String>>,
}

impl ErrorResponse {
    /// Build the envelope for a gateway error
    pub fn from_error(error: &GatewayError) -> Self {
        let kind = error.kind();
        let message = match error {
            // Do not leak filesystem or parser internals to clients
            GatewayError::Io(_) | GatewayError::Yaml(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        Self {
            error: ErrorDetail {
                message,
                error_type: kind.error_type().to_string(),
                code: kind.code().to_string(),
                tried_models: error.tried_models().map(|models| models.to_vec()),
            },
        }
    }
}
