//! Configuration integration tests
//!
//! Files on disk plus environment overrides feeding a working engine.

#[cfg(test)]
mod tests {
    use crate::common::fixtures::chat_completion;
    use crate::common::engine;
    use relay_gateway::config::LogFormat;
    use relay_gateway::{Config, DispatchRequest, user_message};
    use std::io::Write;
    use tempfile::NamedTempFile;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_shipped_example_config_is_valid() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/gateway.yaml.example");
        let config = Config::from_file(path).await.expect("example config parses");

        assert_eq!(config.server().port, 8000);
        assert_eq!(config.logging().format, LogFormat::Text);
        assert!(config.gateway.provider("openrouter").is_some());
        assert!(config.gateway.provider("qwen").is_some());
        assert_eq!(
            config.gateway.model_mapping.get("default").map(String::as_str),
            Some("deepseek/deepseek-chat")
        );
    }

    /// Keys supplied through the environment reach the upstream request
    #[tokio::test]
    async fn test_file_plus_env_keys_drive_engine() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-from-env"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(chat_completion("deepseek/deepseek-chat", "ok")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let yaml = format!(
            r#"
providers:
  - name: upstream
    kind: passthrough
    endpoint: "{}"
    routes: ["deepseek/"]

model_mapping:
  default: deepseek/deepseek-chat

fallbacks: {{}}
"#,
            server.uri()
        );
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = Config::from_file(file.path())
            .await
            .unwrap()
            .with_overrides(|key| (key == "UPSTREAM_API_KEYS").then(|| "sk-from-env".to_string()))
            .unwrap();
        assert!(config.gateway.fallbacks.is_empty());

        let engine = engine(&config.gateway);
        let outcome = engine
            .resolve_and_dispatch("caller", DispatchRequest::chat("", vec![user_message("hi")]))
            .await
            .unwrap();
        assert_eq!(outcome.metadata.target_model, "deepseek/deepseek-chat");
    }

    #[tokio::test]
    async fn test_duplicate_routes_rejected() {
        let yaml = r#"
providers:
  - name: a
    kind: passthrough
    endpoint: "https://a.example.com/v1"
    routes: ["deepseek/"]
  - name: b
    kind: passthrough
    endpoint: "https://b.example.com/v1"
    routes: ["deepseek/"]
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let err = Config::from_file(file.path()).await.unwrap_err();
        assert!(err.to_string().contains("deepseek/"));
    }

    #[tokio::test]
    async fn test_malformed_yaml_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"server: [unclosed").unwrap();
        assert!(Config::from_file(file.path()).await.is_err());
    }
}
