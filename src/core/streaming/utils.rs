//! Utility functions for streaming

use super::types::Event;
use crate::utils::error::{ErrorResponse, GatewayError};

/// Parse SSE data line
pub fn parse_sse_line(line: &str) -> Option<String> {
    line.strip_prefix("data:")
        .map(|stripped| stripped.strip_prefix(' ').unwrap_or(stripped).to_string())
}

/// Check if SSE line indicates end of stream
pub fn is_done_line(line: &str) -> bool {
    line.trim() == "data: [DONE]" || line.trim() == "[DONE]"
}

/// Create an error event carrying the classified error envelope
pub fn create_error_event(error: impl Into<GatewayError>) -> Event {
    let error = error.into();
    let body = serde_json::to_string(&ErrorResponse::from_error(&error))
        .unwrap_or_else(|_| r#"{"error":{"message":"stream failed","type":"unknown_error","code":"UNKNOWN_ERROR"}}"#.to_string());
    Event::default().event("error").data(&body)
}

/// Terminal sentinel
pub fn create_done_event() -> Event {
    Event::default().data("[DONE]")
}
