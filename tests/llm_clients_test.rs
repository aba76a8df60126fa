use std::sync::{Arc, Mutex};

use axum::Router;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::IntoResponse;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use scribe_pipeline::application::ports::{LlmClient, LlmClientError};
use scribe_pipeline::domain::AiProvider;
use scribe_pipeline::infrastructure::llm::{
    AnthropicClient, DeepSeekClient, GeminiClient, LlmClientFactory, OpenAiClient,
};
use scribe_pipeline::presentation::config::{LlmProviderSettings, LlmSettings};

#[derive(Default, Clone)]
struct Seen {
    uri: String,
    headers: HeaderMap,
    body: Value,
}

/// Answers every request with `status`/`body` and records the last one seen.
async fn start_mock_llm(
    status: u16,
    body: Value,
) -> (String, Arc<Mutex<Seen>>, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let seen = Arc::new(Mutex::new(Seen::default()));
    let sink = Arc::clone(&seen);

    let app = Router::new().fallback(move |uri: Uri, headers: HeaderMap, request: String| {
        let sink = Arc::clone(&sink);
        let body = body.clone();
        async move {
            *sink.lock().unwrap() = Seen {
                uri: uri.to_string(),
                headers,
                body: serde_json::from_str(&request).unwrap_or(Value::Null),
            };
            let status = StatusCode::from_u16(status).unwrap();
            (status, axum::Json(body)).into_response()
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    (base_url, seen, shutdown_tx)
}

#[tokio::test]
async fn given_output_text_when_openai_generates_then_returns_it() {
    let (base_url, seen, shutdown_tx) =
        start_mock_llm(200, json!({"output_text": "OpenAI summary"})).await;
    let client = OpenAiClient::new("sk-test".to_string(), Some(base_url), 512);

    let text = client.generate("gpt-4o", "Summarize", "transcript").await.unwrap();

    assert_eq!(text, "OpenAI summary");
    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.uri, "/v1/responses");
    assert_eq!(seen.headers["authorization"], "Bearer sk-test");
    assert_eq!(seen.body["model"], "gpt-4o");
    assert_eq!(seen.body["max_output_tokens"], 512);
    assert_eq!(seen.body["input"][0]["content"][0]["text"], "Summarize");
    assert_eq!(seen.body["input"][0]["content"][1]["text"], "transcript");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_output_items_without_output_text_when_openai_generates_then_first_item_is_used() {
    let (base_url, _seen, shutdown_tx) = start_mock_llm(
        200,
        json!({"output": [{"content": [{"type": "output_text", "text": "from items"}]}]}),
    )
    .await;
    let client = OpenAiClient::new("sk-test".to_string(), Some(base_url), 512);

    let text = client.generate("gpt-4o", "p", "t").await.unwrap();

    assert_eq!(text, "from items");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_rate_limit_when_openai_generates_then_returns_rate_limited() {
    let (base_url, _seen, shutdown_tx) =
        start_mock_llm(429, json!({"error": {"message": "slow down"}})).await;
    let client = OpenAiClient::new("sk-test".to_string(), Some(base_url), 512);

    let result = client.generate("gpt-4o", "p", "t").await;

    assert!(matches!(result, Err(LlmClientError::RateLimited)));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_text_blocks_when_anthropic_generates_then_blocks_are_joined() {
    let (base_url, seen, shutdown_tx) = start_mock_llm(
        200,
        json!({"content": [{"type": "text", "text": "first"}, {"type": "text", "text": "second"}]}),
    )
    .await;
    let client = AnthropicClient::new(
        "ak-test".to_string(),
        Some(base_url),
        "2023-06-01".to_string(),
        1024,
    );

    let text = client
        .generate("claude-sonnet", "Write minutes", "hello")
        .await
        .unwrap();

    assert_eq!(text, "first\nsecond");
    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.uri, "/v1/messages");
    assert_eq!(seen.headers["x-api-key"], "ak-test");
    assert_eq!(seen.headers["anthropic-version"], "2023-06-01");
    assert_eq!(seen.body["messages"][0]["content"], "Write minutes\n\nhello");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_server_error_when_anthropic_generates_then_returns_api_error() {
    let (base_url, _seen, shutdown_tx) =
        start_mock_llm(500, json!({"error": "overloaded"})).await;
    let client = AnthropicClient::new(
        "ak-test".to_string(),
        Some(base_url),
        "2023-06-01".to_string(),
        1024,
    );

    let result = client.generate("claude-sonnet", "p", "t").await;

    match result {
        Err(LlmClientError::ApiRequestFailed(msg)) => assert!(msg.contains("500"), "{msg}"),
        other => panic!("unexpected result: {other:?}"),
    }
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_choice_when_deepseek_generates_then_message_content_is_returned() {
    let (base_url, seen, shutdown_tx) = start_mock_llm(
        200,
        json!({"choices": [{"message": {"role": "assistant", "content": "deep answer"}}]}),
    )
    .await;
    let client = DeepSeekClient::new("ds-test".to_string(), Some(base_url));

    let text = client.generate("deepseek-chat", "p", "t").await.unwrap();

    assert_eq!(text, "deep answer");
    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.uri, "/chat/completions");
    assert_eq!(seen.body["messages"][0]["role"], "system");
    assert_eq!(seen.body["messages"][1]["content"], "p\n\nt");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_candidate_when_gemini_generates_then_parts_are_joined() {
    let (base_url, seen, shutdown_tx) = start_mock_llm(
        200,
        json!({"candidates": [{"content": {"role": "model", "parts": [{"text": "gem"}, {"text": "ini"}]}}]}),
    )
    .await;
    let client = GeminiClient::new("g-key".to_string(), Some(base_url));

    let text = client.generate("gemini-2.0-flash", "p", "t").await.unwrap();

    assert_eq!(text, "gem\nini");
    let seen = seen.lock().unwrap().clone();
    assert_eq!(
        seen.uri,
        "/v1beta/models/gemini-2.0-flash:generateContent?key=g-key"
    );
    shutdown_tx.send(()).ok();
}

#[test]
fn given_keys_for_some_providers_when_building_registry_then_only_those_are_registered() {
    let settings = LlmSettings {
        openai: LlmProviderSettings {
            api_key: Some("sk".to_string()),
            base_url: None,
        },
        gemini: LlmProviderSettings {
            api_key: Some("   ".to_string()),
            base_url: None,
        },
        ..LlmSettings::default()
    };

    let registry = LlmClientFactory::create(&settings);

    assert_eq!(registry.providers(), vec![AiProvider::OpenAi]);
    assert!(registry.get(AiProvider::Gemini).is_none());
}
