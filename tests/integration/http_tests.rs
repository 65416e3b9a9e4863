//! HTTP surface integration tests
//!
//! Drives the actix app built by `HttpServer::create_app` end to end.

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{chat_completion, chat_request, sse_body};
    use crate::common::{app_state, gateway_config};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use relay_gateway::server::HttpServer;
    use serde_json::{Value, json};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_chat(server: &MockServer, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_completion("deepseek/deepseek-chat", "Hi there")),
            )
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[actix_web::test]
    async fn test_health_endpoint() {
        let app = test::init_service(HttpServer::create_app(app_state(gateway_config(
            "http://127.0.0.1:9",
        ))))
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], relay_gateway::VERSION);
        assert!(body["components"]["providers"].is_object());
    }

    #[actix_web::test]
    async fn test_models_lists_client_names() {
        let app = test::init_service(HttpServer::create_app(app_state(gateway_config(
            "http://127.0.0.1:9",
        ))))
        .await;

        let req = test::TestRequest::get().uri("/v1/models").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["object"], "list");
        let ids: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|m| m["id"].as_str())
            .collect();
        assert!(ids.contains(&"gpt-4"));
        assert!(ids.contains(&"text-embedding-ada-002"));
        assert!(!ids.contains(&"deepseek/deepseek-chat"));
    }

    #[actix_web::test]
    async fn test_chat_completion_and_cache_headers() {
        let server = MockServer::start().await;
        mock_chat(&server, 1).await;
        let app = test::init_service(HttpServer::create_app(app_state(gateway_config(&server.uri())))).await;

        for expected_cache in ["MISS", "HIT"] {
            let req = test::TestRequest::post()
                .uri("/v1/chat/completions")
                .insert_header(("Authorization", "Bearer sk-client"))
                .set_json(chat_request("gpt-4"))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(resp.headers().get("x-cache").unwrap(), expected_cache);
            assert_eq!(resp.headers().get("x-served-model").unwrap(), "deepseek/deepseek-chat");
            assert_eq!(resp.headers().get("x-ratelimit-limit").unwrap(), "100");

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["model"], "gpt-4");
            assert_eq!(body["choices"][0]["message"]["content"], "Hi there");
        }
    }

    #[actix_web::test]
    async fn test_rate_limit_returns_429() {
        let server = MockServer::start().await;
        mock_chat(&server, 1).await;

        let mut config = gateway_config(&server.uri());
        config.rate_limit.max_requests = 2;
        let app = test::init_service(HttpServer::create_app(app_state(config))).await;

        let send = |token: &'static str| {
            test::TestRequest::post()
                .uri("/v1/chat/completions")
                .insert_header(("Authorization", format!("Bearer {}", token)))
                .set_json(chat_request("gpt-4"))
                .to_request()
        };

        for _ in 0..2 {
            let resp = test::call_service(&app, send("sk-busy")).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let resp = test::call_service(&app, send("sk-busy")).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(resp.headers().get("retry-after").is_some());
        assert_eq!(resp.headers().get("x-ratelimit-remaining").unwrap(), "0");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "RATE_LIMIT_EXCEEDED");
        assert_eq!(body["error"]["type"], "rate_limit_exceeded");

        // Buckets are per caller
        let resp = test::call_service(&app, send("sk-idle")).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_empty_messages_rejected() {
        let app = test::init_service(HttpServer::create_app(app_state(gateway_config(
            "http://127.0.0.1:9",
        ))))
        .await;

        let req = test::TestRequest::post()
            .uri("/v1/chat/completions")
            .set_json(json!({"model": "gpt-4", "messages": []}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[actix_web::test]
    async fn test_exhausted_fallbacks_report_tried_models() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let app = test::init_service(HttpServer::create_app(app_state(gateway_config(&server.uri())))).await;

        let req = test::TestRequest::post()
            .uri("/v1/chat/completions")
            .set_json(chat_request("gpt-4"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "PROVIDER_ERROR");
        assert_eq!(
            body["error"]["tried_models"],
            json!(["deepseek/deepseek-chat", "qwen/qwen-max"])
        );
    }

    #[actix_web::test]
    async fn test_streaming_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse_body("deepseek/deepseek-chat")),
            )
            .mount(&server)
            .await;
        let app = test::init_service(HttpServer::create_app(app_state(gateway_config(&server.uri())))).await;

        let mut request = chat_request("gpt-4");
        request["stream"] = json!(true);
        let req = test::TestRequest::post()
            .uri("/v1/chat/completions")
            .set_json(request)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(
            resp.headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.starts_with("text/event-stream"))
        );

        let body = test::read_body(resp).await;
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(text.matches("data: [DONE]").count(), 1);
        assert!(text.contains("\"model\":\"gpt-4\""));
    }

    #[actix_web::test]
    async fn test_admin_routes_absent_without_token() {
        let app = test::init_service(HttpServer::create_app(app_state(gateway_config(
            "http://127.0.0.1:9",
        ))))
        .await;

        let req = test::TestRequest::get().uri("/admin/mappings").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_admin_requires_token() {
        let mut config = gateway_config("http://127.0.0.1:9");
        config.server.admin_token = Some("secret".to_string());
        let app = test::init_service(HttpServer::create_app(app_state(config))).await;

        let req = test::TestRequest::get().uri("/admin/mappings").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/admin/mappings")
            .insert_header(("Authorization", "Bearer wrong"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/admin/mappings")
            .insert_header(("Authorization", "Bearer secret"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["gpt-4"], "deepseek/deepseek-chat");
    }

    /// Register a provider, map a name onto it, clear the cache, remove it
    #[actix_web::test]
    async fn test_admin_custom_provider_lifecycle() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/local/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion("mistral", "local")))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = gateway_config(&server.uri());
        config.server.admin_token = Some("secret".to_string());
        let app = test::init_service(HttpServer::create_app(app_state(config))).await;
        let admin = |req: test::TestRequest| {
            req.insert_header(("Authorization", "Bearer secret")).to_request()
        };

        let req = admin(test::TestRequest::post().uri("/admin/providers").set_json(json!({
            "name": "local",
            "endpoint": format!("{}/local", server.uri()),
            "api_keys": ["sk-local"],
            "model_prefix": "local/"
        })));
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["routes"], json!(["local/"]));

        let req = admin(
            test::TestRequest::put()
                .uri("/admin/mappings/mistral")
                .set_json(json!({"target": "local/mistral"})),
        );
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/v1/chat/completions")
            .set_json(chat_request("mistral"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["model"], "mistral");

        let req = admin(test::TestRequest::post().uri("/admin/cache/clear"));
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["cleared"], 1);

        let req = admin(test::TestRequest::delete().uri("/admin/providers/local"));
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = admin(test::TestRequest::delete().uri("/admin/providers/openrouter"));
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = admin(test::TestRequest::delete().uri("/admin/fallbacks/unknown-model"));
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
