//! Streaming response handling for AI providers
//!
//! This module provides Server-Sent Events (SSE) relaying from upstream
//! providers to clients.

use crate::utils::error::Result;
use actix_web::HttpResponse;
use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use bytes::Bytes;
use futures::stream::Stream;

// Module declarations
mod handler;
mod types;
pub mod utils;


pub use handler::StreamingHandler;
pub use types::{Event, FrameTooLarge, MAX_EVENT_BYTES, SseFramer};
pub use utils::{create_done_event, create_error_event, is_done_line, parse_sse_line};

/// Create a Server-Sent Events response for Actix-web
pub fn create_sse_response<S>(stream: S) -> HttpResponse
where
    S: Stream<Item = Result<Bytes>> + 'static,
{
    HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, "text/event-stream"))
        .insert_header((CACHE_CONTROL, "no-cache"))
        .insert_header(("Connection", "keep-alive"))
        .streaming(stream)
}
