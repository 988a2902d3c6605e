//! # HTTP Provider Tests
//!
//! Exercises `LocalAiProvider` and `HttpEmbedder` against a `wiremock` server.

use agrorag::{
    errors::PromptError,
    providers::ai::{AiProvider, Embedder, HttpEmbedder, LocalAiProvider},
    types::{ChatMessage, CompletionRequest},
};
use serde_json::json;
use std::sync::Once;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static INIT: Once = Once::new();

/// Initializes tracing for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

fn request() -> CompletionRequest {
    CompletionRequest {
        model: "llama-3.3-70b-versatile".to_string(),
        messages: vec![
            ChatMessage::system("You are an AI agronomist."),
            ChatMessage::user("Context:\nrice - N: 60\n\nQuestion:\nN for rice?"),
        ],
        temperature: 0.2,
    }
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ]
    })
}

#[tokio::test]
async fn test_local_provider_posts_messages_and_returns_content() {
    // --- 1. Arrange ---
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "llama-3.3-70b-versatile",
            "stream": false,
            "messages": [
                { "role": "system", "content": "You are an AI agronomist." },
                { "role": "user", "content": "Context:\nrice - N: 60\n\nQuestion:\nN for rice?" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("About 60 kg/ha.")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = LocalAiProvider::new(
        format!("{}/v1/chat/completions", server.uri()),
        Some("test-key".to_string()),
        Duration::from_secs(5),
    )
    .unwrap();

    // --- 2. Act ---
    let answer = provider.complete(&request()).await.unwrap();

    // --- 3. Assert ---
    assert_eq!(answer, "About 60 kg/ha.");
}

#[tokio::test]
async fn test_local_provider_without_key_sends_no_auth_header() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .mount(&server)
        .await;

    let provider =
        LocalAiProvider::new(server.uri(), None, Duration::from_secs(5)).unwrap();
    provider.complete(&request()).await.unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(!received[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_local_provider_error_status_is_api_error() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let provider =
        LocalAiProvider::new(server.uri(), None, Duration::from_secs(5)).unwrap();
    let err = provider.complete(&request()).await.unwrap_err();

    match err {
        PromptError::AiApi(message) => {
            assert!(message.contains("429"));
            assert!(message.contains("rate limited"));
        }
        other => panic!("expected AiApi, got {other:?}"),
    }
}

#[tokio::test]
async fn test_local_provider_empty_choices() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let provider =
        LocalAiProvider::new(server.uri(), None, Duration::from_secs(5)).unwrap();
    let err = provider.complete(&request()).await.unwrap_err();
    assert!(matches!(err, PromptError::EmptyCompletion));
}

#[tokio::test]
async fn test_local_provider_slow_answer_is_a_timeout() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body("too late"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let provider =
        LocalAiProvider::new(server.uri(), None, Duration::from_millis(100)).unwrap();
    let err = provider.complete(&request()).await.unwrap_err();
    assert!(err.is_timeout(), "expected a timeout, got {err:?}");
}

#[tokio::test]
async fn test_http_embedder_batches_and_orders_by_index() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_partial_json(json!({
            "model": "all-minilm",
            "input": ["tomato - N: 120", "rice - N: 60"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "index": 1, "embedding": [0.0, 1.0] },
                { "index": 0, "embedding": [1.0, 0.0] }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let embedder = HttpEmbedder::new(
        format!("{}/v1/embeddings", server.uri()),
        "all-minilm".to_string(),
        None,
        Duration::from_secs(5),
    )
    .unwrap();

    let vectors = embedder
        .embed(&["tomato - N: 120".to_string(), "rice - N: 60".to_string()])
        .await
        .unwrap();
    assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
}

#[tokio::test]
async fn test_http_embedder_count_mismatch() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [ { "index": 0, "embedding": [1.0, 0.0] } ]
        })))
        .mount(&server)
        .await;

    let embedder = HttpEmbedder::new(
        server.uri(),
        "all-minilm".to_string(),
        None,
        Duration::from_secs(5),
    )
    .unwrap();

    let err = embedder
        .embed(&["a".to_string(), "b".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PromptError::EmbeddingCountMismatch { expected: 2, got: 1 }
    ));
}

#[tokio::test]
async fn test_http_embedder_empty_batch_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let embedder = HttpEmbedder::new(
        server.uri(),
        "all-minilm".to_string(),
        None,
        Duration::from_secs(5),
    )
    .unwrap();
    assert!(embedder.embed(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_http_embedder_gemini_sends_one_request_per_text() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/text-embedding-004:embedContent"))
        .and(header("x-goog-api-key", "g-key"))
        .and(body_partial_json(json!({ "model": "models/text-embedding-004" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embedding": { "values": [0.6, 0.8] }
        })))
        .expect(2)
        .mount(&server)
        .await;

    let embedder = HttpEmbedder::new(
        format!("{}/v1beta/models/text-embedding-004:embedContent", server.uri()),
        "text-embedding-004".to_string(),
        Some("g-key".to_string()),
        Duration::from_secs(5),
    )
    .unwrap();

    let vectors = embedder
        .embed(&["basil - ideal_ph: 5.5-6.5".to_string(), "rice - N: 60".to_string()])
        .await
        .unwrap();
    assert_eq!(vectors, vec![vec![0.6, 0.8], vec![0.6, 0.8]]);
}

#[tokio::test]
async fn test_http_embedder_error_status_is_reported() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
        .mount(&server)
        .await;

    let embedder = HttpEmbedder::new(
        format!("{}/v1/embeddings", server.uri()),
        "all-minilm".to_string(),
        None,
        Duration::from_secs(5),
    )
    .unwrap();

    match embedder.embed(&["rice - N: 60".to_string()]).await.unwrap_err() {
        PromptError::AiApi(message) => {
            assert!(message.contains("503"), "{message}");
            assert!(message.contains("model loading"));
        }
        other => panic!("expected AiApi, got {other:?}"),
    }
}
