//! Common test utilities for relay-gateway
//!
//! - Configuration builders that point providers at `wiremock` servers
//! - Upstream response fixtures
//! - Helpers to build an engine or an actix test app
//! - A raw TCP upstream that trickles SSE events

pub mod fixtures;

use relay_gateway::Config;
use relay_gateway::config::{GatewayConfig, ProviderConfig, default_api_key_header};
use relay_gateway::core::dispatcher::DispatchEngine;
use relay_gateway::core::providers::ProviderKind;
use relay_gateway::server::AppState;
use actix_web::web;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Path the session provider is mounted on in mock servers
pub const SESSION_PATH: &str = "/api/v1/services/aigc/text-generation/generation";

/// Passthrough provider serving the `deepseek/` and `openai/` namespaces
pub fn passthrough_provider(endpoint: &str, keys: &[&str]) -> ProviderConfig {
    ProviderConfig {
        name: "openrouter".to_string(),
        kind: ProviderKind::Passthrough,
        endpoint: endpoint.to_string(),
        api_keys: keys.iter().map(|k| k.to_string()).collect(),
        api_key_header: default_api_key_header(),
        model_prefix: None,
        routes: vec!["deepseek/".to_string(), "openai/".to_string()],
    }
}

/// Session provider serving the `qwen/` namespace
pub fn session_provider(base_url: &str, keys: &[&str]) -> ProviderConfig {
    ProviderConfig {
        name: "qwen".to_string(),
        kind: ProviderKind::Session,
        endpoint: format!("{}{}", base_url, SESSION_PATH),
        api_keys: keys.iter().map(|k| k.to_string()).collect(),
        api_key_header: default_api_key_header(),
        model_prefix: Some("qwen/".to_string()),
        routes: vec!["qwen/".to_string()],
    }
}

/// Default mapping and fallbacks with both providers pointed at `base_url`
///
/// Retries back off by a millisecond so exhausted budgets stay fast.
pub fn gateway_config(base_url: &str) -> GatewayConfig {
    let mut config = GatewayConfig {
        providers: vec![
            passthrough_provider(base_url, &["sk-openrouter"]),
            session_provider(base_url, &["sk-qwen"]),
        ],
        ..GatewayConfig::default()
    };
    config.router.max_retries = 3;
    config.router.retry_delay_ms = 1;
    config.router.max_delay_ms = 5;
    config.router.timeout_secs = 5;
    config
}

/// Build an engine, panicking on invalid test configuration
pub fn engine(config: &GatewayConfig) -> DispatchEngine {
    DispatchEngine::from_config(config).expect("engine should build")
}

/// Shared state for an actix test app
pub fn app_state(gateway: GatewayConfig) -> web::Data<AppState> {
    let engine = Arc::new(engine(&gateway));
    let config = Arc::new(Config { gateway });
    web::Data::new(AppState::new(config, engine))
}

/// Serve one chunked SSE response, waiting `gap` before each write
///
/// `tail_gap` is slept after the last event, before the body is terminated.
/// Returns the base URL to point a passthrough provider at.
pub async fn trickling_sse_upstream(events: Vec<String>, gap: Duration, tail_gap: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind upstream");
    let addr = listener.local_addr().expect("upstream address");

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        if read_request(&mut socket).await.is_err() {
            return;
        }

        let head = "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ntransfer-encoding: chunked\r\n\r\n";
        if socket.write_all(head.as_bytes()).await.is_err() {
            return;
        }
        for (i, event) in events.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(gap).await;
            }
            let chunk = format!("{:x}\r\n{}\r\n", event.len(), event);
            if socket.write_all(chunk.as_bytes()).await.is_err() {
                return;
            }
            let _ = socket.flush().await;
        }
        tokio::time::sleep(tail_gap).await;
        let _ = socket.write_all(b"0\r\n\r\n").await;
        let _ = socket.shutdown().await;
    });

    format!("http://{}", addr)
}

/// Consume request head and body so the client sees a clean exchange
async fn read_request(socket: &mut TcpStream) -> std::io::Result<()> {
    let mut received = Vec::new();
    let mut buf = [0u8; 4096];
    let head_end = loop {
        let n = socket.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        received.extend_from_slice(&buf[..n]);
        if let Some(pos) = received.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&received[..head_end]).to_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while received.len() - head_end < content_length {
        let n = socket.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        received.extend_from_slice(&buf[..n]);
    }
    Ok(())
}
