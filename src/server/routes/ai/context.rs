//! Caller identity and response header helpers

use crate::core::dispatcher::DispatchMetadata;
use crate::core::rate_limiter::RateLimitStatus;
use actix_web::HttpRequest;
use actix_web::http::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};

const X_API_KEY: &str = "x-api-key";

/// Key the caller's rate-limit bucket is stored under.
///
/// Bearer token of `Authorization`, else `X-Api-Key`, else the peer address.
pub fn caller_identity(req: &HttpRequest) -> String {
    let headers = req.headers();

    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            value
                .strip_prefix("Bearer ")
                .or_else(|| value.strip_prefix("bearer "))
        })
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return token.to_string();
    }

    let api_key = headers
        .get(X_API_KEY)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty());
    if let Some(key) = api_key {
        return key.to_string();
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "anonymous".to_string())
}

/// `X-RateLimit-*` headers for a caller's bucket
pub fn insert_rate_limit_headers(headers: &mut HeaderMap, status: &RateLimitStatus) {
    headers.insert(
        HeaderName::from_static("x-ratelimit-limit"),
        HeaderValue::from(status.limit),
    );
    headers.insert(
        HeaderName::from_static("x-ratelimit-remaining"),
        HeaderValue::from(status.remaining),
    );
    headers.insert(
        HeaderName::from_static("x-ratelimit-reset"),
        HeaderValue::from(status.reset_at),
    );
}

/// Rate limit, served model and cache headers of a successful dispatch
pub fn insert_dispatch_headers(headers: &mut HeaderMap, metadata: &DispatchMetadata) {
    if let Some(status) = &metadata.rate_limit {
        insert_rate_limit_headers(headers, status);
    }

    if let Ok(model) = HeaderValue::from_str(&metadata.served_model) {
        headers.insert(HeaderName::from_static("x-served-model"), model);
    }

    headers.insert(
        HeaderName::from_static("x-cache"),
        HeaderValue::from_static(if metadata.cache_hit { "HIT" } else { "MISS" }),
    );
}
