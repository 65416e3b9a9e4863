//! Upstream response fixtures

use serde_json::{Value, json};

/// OpenAI-shaped chat completion as an upstream returns it
pub fn chat_completion(model: &str, content: &str) -> Value {
    json!({
        "id": "chatcmpl-upstream",
        "object": "chat.completion",
        "created": 1704067200,
        "model": model,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
}

/// Session-shaped reply
pub fn session_reply(content: &str) -> Value {
    json!({
        "request_id": "req-123",
        "output": {
            "choices": [{
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        },
        "usage": {"input_tokens": 8, "output_tokens": 3, "total_tokens": 11}
    })
}

/// OpenAI-shaped embedding list
pub fn embedding_list(model: &str) -> Value {
    json!({
        "object": "list",
        "model": model,
        "data": [{"object": "embedding", "index": 0, "embedding": [0.1, 0.2, 0.3]}],
        "usage": {"prompt_tokens": 2, "completion_tokens": 0, "total_tokens": 2}
    })
}

/// Upstream error envelope
pub fn upstream_error(message: &str) -> Value {
    json!({"error": {"message": message, "type": "server_error"}})
}

/// Two content chunks followed by the sentinel
pub fn sse_body(model: &str) -> String {
    let chunk = |content: &str| {
        json!({
            "id": "chatcmpl-stream",
            "object": "chat.completion.chunk",
            "model": model,
            "choices": [{"index": 0, "delta": {"content": content}, "finish_reason": null}]
        })
    };
    format!(
        ": keep-alive\n\ndata: {}\n\ndata: {}\n\ndata: [DONE]\n\n",
        chunk("Hel"),
        chunk("lo")
    )
}

/// Chat request body as a client sends it
pub fn chat_request(model: &str) -> Value {
    json!({
        "model": model,
        "messages": [{"role": "user", "content": "Hello"}]
    })
}
