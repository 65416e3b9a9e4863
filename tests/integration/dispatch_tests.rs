//! Dispatch engine integration tests
//!
//! Retry, fallback, caching and streaming against mock upstreams.

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{chat_completion, embedding_list, session_reply, sse_body, upstream_error};
    use crate::common::{
        SESSION_PATH, engine, gateway_config, passthrough_provider, trickling_sse_upstream,
    };
    use futures::StreamExt;
    use relay_gateway::config::{ProviderConfig, default_api_key_header};
    use relay_gateway::core::providers::ProviderKind;
    use relay_gateway::utils::error::ErrorKind;
    use relay_gateway::{DispatchBody, DispatchRequest, user_message};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn hello(model: &str) -> DispatchRequest {
        DispatchRequest::chat(model, vec![user_message("Hello")])
    }

    /// Primary model exhausts its retries, the session-shaped fallback answers
    #[tokio::test]
    async fn test_fallback_after_retries_exhausted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({"model": "deepseek/deepseek-chat"})))
            .respond_with(ResponseTemplate::new(500).set_body_json(upstream_error("boom")))
            .expect(3)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(SESSION_PATH))
            .and(header("Authorization", "Bearer sk-qwen"))
            .and(body_partial_json(json!({"model": "qwen-max"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(session_reply("from qwen")))
            .expect(1)
            .mount(&server)
            .await;

        let engine = engine(&gateway_config(&server.uri()));
        let outcome = engine
            .resolve_and_dispatch("caller", hello("gpt-4"))
            .await
            .expect("fallback should succeed");

        let DispatchBody::Complete(response) = outcome.body else {
            panic!("expected a complete response");
        };
        assert_eq!(response.model, "gpt-4");
        assert_eq!(response.first_content().as_deref(), Some("from qwen"));

        let metadata = outcome.metadata;
        assert_eq!(metadata.target_model, "deepseek/deepseek-chat");
        assert_eq!(metadata.served_model, "qwen/qwen-max");
        assert_eq!(metadata.provider.as_deref(), Some("qwen"));
        assert_eq!(metadata.attempts, 4);
        assert!(metadata.used_fallback);
        assert_eq!(metadata.tried_models, vec!["deepseek/deepseek-chat".to_string()]);
    }

    /// Both models fail; the error names every model that was tried
    #[tokio::test]
    async fn test_fallback_chain_exhausted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(502))
            .expect(3)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(SESSION_PATH))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let engine = engine(&gateway_config(&server.uri()));
        // A cycle back to the primary must not be followed
        engine.set_fallback("qwen/qwen-max", "deepseek/deepseek-chat").unwrap();
        let err = engine
            .resolve_and_dispatch("caller", hello("gpt-4"))
            .await
            .expect_err("every model fails");

        assert_eq!(err.kind(), ErrorKind::Provider);
        assert_eq!(
            err.tried_models().map(|m| m.to_vec()),
            Some(vec![
                "deepseek/deepseek-chat".to_string(),
                "qwen/qwen-max".to_string()
            ])
        );
    }

    /// A provider without keys fails closed without touching the network
    #[tokio::test]
    async fn test_empty_key_pool_is_configuration_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion("x", "y")))
            .expect(0)
            .mount(&server)
            .await;

        let mut config = gateway_config(&server.uri());
        config.providers[0] = passthrough_provider(&server.uri(), &[]);

        let engine = engine(&config);
        let err = engine
            .resolve_and_dispatch("caller", hello("gpt-4"))
            .await
            .expect_err("no keys configured");

        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.http_status(), 503);
        assert!(err.tried_models().is_none());
    }

    /// Aliases of one target share a cache entry; each sees its own name
    #[tokio::test]
    async fn test_cache_shared_across_aliases() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_completion("deepseek/deepseek-chat", "cached")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let engine = engine(&gateway_config(&server.uri()));

        let first = engine.resolve_and_dispatch("caller", hello("gpt-4")).await.unwrap();
        assert!(!first.metadata.cache_hit);

        let second = engine
            .resolve_and_dispatch("caller", hello("gpt-3.5-turbo"))
            .await
            .unwrap();
        assert!(second.metadata.cache_hit);
        assert_eq!(second.metadata.attempts, 0);
        assert_eq!(second.metadata.served_model, "deepseek/deepseek-chat");

        let DispatchBody::Complete(response) = second.body else {
            panic!("expected a complete response");
        };
        assert_eq!(response.model, "gpt-3.5-turbo");
        assert_eq!(response.first_content().as_deref(), Some("cached"));
        assert_eq!(engine.cache_stats().hits, 1);
    }

    /// Expired entries are refetched
    #[tokio::test]
    async fn test_cache_entry_expires() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_completion("deepseek/deepseek-chat", "fresh")),
            )
            .expect(2)
            .mount(&server)
            .await;

        let mut config = gateway_config(&server.uri());
        config.cache.ttl_ms = 50;
        let engine = engine(&config);

        engine.resolve_and_dispatch("caller", hello("gpt-4")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        let again = engine.resolve_and_dispatch("caller", hello("gpt-4")).await.unwrap();
        assert!(!again.metadata.cache_hit);
    }

    /// Admin-registered providers have their prefix stripped upstream
    #[tokio::test]
    async fn test_custom_provider_strips_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("X-Api-Key", "sk-local"))
            .and(body_partial_json(json!({"model": "llama3"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion("llama3", "local")))
            .expect(1)
            .mount(&server)
            .await;

        let engine = engine(&gateway_config(&server.uri()));
        let summary = engine
            .register_custom_provider(ProviderConfig {
                name: "local".to_string(),
                kind: ProviderKind::Custom,
                endpoint: format!("{}/v1", server.uri()),
                api_keys: vec!["sk-local".to_string()],
                api_key_header: "X-Api-Key".to_string(),
                model_prefix: Some("local/".to_string()),
                routes: vec!["local/".to_string()],
            })
            .expect("custom provider registers");
        assert_eq!(summary.name, "local");

        engine.set_mapping("llama", "local/llama3").unwrap();
        let outcome = engine.resolve_and_dispatch("caller", hello("llama")).await.unwrap();
        assert_eq!(outcome.metadata.provider.as_deref(), Some("local"));
        assert_eq!(outcome.metadata.served_model, "local/llama3");

        engine.remove_custom_provider("local").unwrap();
        engine.clear_cache();
        let err = engine
            .resolve_and_dispatch("caller", hello("llama"))
            .await
            .expect_err("route is gone");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    /// Only custom providers are accepted at runtime
    #[tokio::test]
    async fn test_register_rejects_non_custom_provider() {
        let engine = engine(&gateway_config("http://127.0.0.1:9"));
        let err = engine
            .register_custom_provider(ProviderConfig {
                name: "extra".to_string(),
                kind: ProviderKind::Passthrough,
                endpoint: "http://127.0.0.1:9".to_string(),
                api_keys: vec![],
                api_key_header: default_api_key_header(),
                model_prefix: None,
                routes: vec!["extra/".to_string()],
            })
            .expect_err("passthrough providers come from config");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_embeddings_passthrough() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(body_partial_json(json!({"model": "openai/text-embedding-3-small"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(embedding_list("openai/text-embedding-3-small")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let engine = engine(&gateway_config(&server.uri()));
        let request = DispatchRequest::embedding("text-embedding-ada-002", json!("hello"));
        let outcome = engine.resolve_and_dispatch("caller", request).await.unwrap();

        let DispatchBody::Complete(response) = outcome.body else {
            panic!("expected a complete response");
        };
        assert_eq!(response.model, "text-embedding-ada-002");
        assert_eq!(response.data.map(|d| d.len()), Some(1));
    }

    /// Streams are relayed with the alias and a single terminator
    #[tokio::test]
    async fn test_streaming_relay_rewrites_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({"stream": true})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse_body("deepseek/deepseek-chat")),
            )
            .expect(2)
            .mount(&server)
            .await;

        let engine = engine(&gateway_config(&server.uri()));
        for _ in 0..2 {
            let outcome = engine
                .resolve_and_dispatch("caller", hello("gpt-4").with_stream(true))
                .await
                .unwrap();
            assert!(!outcome.metadata.cache_hit);

            let DispatchBody::Stream(stream) = outcome.body else {
                panic!("expected a stream");
            };
            let chunks: Vec<_> = stream.collect().await;
            let text: String = chunks
                .into_iter()
                .map(|chunk| String::from_utf8(chunk.unwrap().to_vec()).unwrap())
                .collect();

            assert!(!text.contains("keep-alive"));
            assert!(!text.contains("deepseek/deepseek-chat"));
            assert_eq!(text.matches("\"model\":\"gpt-4\"").count(), 2);
            assert_eq!(text.matches("data: [DONE]").count(), 1);
            assert!(text.ends_with("data: [DONE]\n\n"));
        }
    }

    /// Streaming to a provider that cannot stream is a validation error
    #[tokio::test]
    async fn test_streaming_unsupported_target() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let engine = engine(&gateway_config(&server.uri()));
        let err = engine
            .resolve_and_dispatch("caller", hello("qwen/qwen-max").with_stream(true))
            .await
            .expect_err("session providers do not stream");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    async fn collect_stream(outcome: relay_gateway::DispatchOutcome) -> String {
        let DispatchBody::Stream(stream) = outcome.body else {
            panic!("expected a stream");
        };
        let chunks: Vec<_> = stream.collect().await;
        chunks
            .into_iter()
            .map(|chunk| String::from_utf8(chunk.unwrap().to_vec()).unwrap())
            .collect()
    }

    fn numbered_events(count: usize) -> Vec<String> {
        let mut events: Vec<String> = (0..count)
            .map(|i| format!("data: {{\"model\":\"deepseek/deepseek-chat\",\"i\":{}}}\n\n", i))
            .collect();
        events.push("data: [DONE]\n\n".to_string());
        events
    }

    /// A stream that keeps sending outlives the request deadline
    #[tokio::test]
    async fn test_long_healthy_stream_is_not_cut_off() {
        let upstream =
            trickling_sse_upstream(numbered_events(4), Duration::from_millis(400), Duration::ZERO).await;
        let mut config = gateway_config(&upstream);
        config.router.timeout_secs = 1;
        let engine = engine(&config);

        let outcome = engine
            .resolve_and_dispatch("caller", hello("gpt-4").with_stream(true))
            .await
            .unwrap();
        let text = collect_stream(outcome).await;

        assert!(!text.contains("event: error"), "unexpected failure: {}", text);
        for i in 0..4 {
            assert!(text.contains(&format!("\"i\":{}", i)), "missing event {}: {}", i, text);
        }
        assert_eq!(text.matches("data: [DONE]").count(), 1);
        assert!(text.ends_with("data: [DONE]\n\n"));
    }

    /// An upstream that goes silent mid-stream fails with one error event
    #[tokio::test]
    async fn test_stalled_stream_fails_after_idle_timeout() {
        let mut events = numbered_events(1);
        events.pop();
        let upstream =
            trickling_sse_upstream(events, Duration::ZERO, Duration::from_secs(3)).await;
        let mut config = gateway_config(&upstream);
        config.router.timeout_secs = 1;
        let engine = engine(&config);

        let outcome = engine
            .resolve_and_dispatch("caller", hello("gpt-4").with_stream(true))
            .await
            .unwrap();
        let text = collect_stream(outcome).await;

        assert!(text.contains("\"i\":0"));
        assert_eq!(text.matches("event: error").count(), 1);
        assert!(text.contains("no data from upstream"));
        assert!(text.ends_with("data: [DONE]\n\n"));
    }
}
