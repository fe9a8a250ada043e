//! HTTP-level tests for the Ollama backend against a mock server.

use dupwatch_core::{EmbeddingBackend, Error, GenerationBackend};
use dupwatch_inference::OllamaBackend;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> OllamaBackend {
    OllamaBackend::with_config(
        server.uri(),
        "test-embed".to_string(),
        "test-gen".to_string(),
        3,
    )
}

#[tokio::test]
async fn embed_texts_sends_model_and_returns_vectors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_partial_json(json!({"model": "test-embed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let vectors = backend
        .embed_texts(&["first".to_string(), "second".to_string()])
        .await
        .unwrap();

    assert_eq!(vectors.len(), 2);
    assert_eq!(vectors[0], vec![0.1, 0.2, 0.3]);
}

#[tokio::test]
async fn embed_texts_empty_input_skips_request() {
    let server = MockServer::start().await;
    // No mock mounted: any request would 404 and fail the call.
    let backend = backend_for(&server);

    let vectors = backend.embed_texts(&[]).await.unwrap();
    assert!(vectors.is_empty());
}

#[tokio::test]
async fn embed_texts_maps_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not found"))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let err = backend.embed_texts(&["text".to_string()]).await.unwrap_err();

    match err {
        Error::Embedding(msg) => {
            assert!(msg.contains("500"));
            assert!(msg.contains("model not found"));
        }
        other => panic!("Expected Embedding error, got: {other}"),
    }
}

#[tokio::test]
async fn embed_texts_rejects_count_mismatch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[0.1]]
        })))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let err = backend
        .embed_texts(&["a".to_string(), "b".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Embedding(_)));
}

#[tokio::test]
async fn generate_returns_message_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"model": "test-gen", "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"role": "assistant", "content": "hello there"},
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let response = backend.generate("say hello").await.unwrap();
    assert_eq!(response, "hello there");
}

#[tokio::test]
async fn generate_json_requests_format_enforcement() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"format": "json", "think": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"role": "assistant", "content": "{\"query\": \"x\"}"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let response = backend.generate_json("produce json").await.unwrap();
    assert_eq!(response, "{\"query\": \"x\"}");
}

#[tokio::test]
async fn generate_empty_content_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"role": "assistant", "content": "  "}
        })))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let err = backend.generate("prompt").await.unwrap_err();
    assert!(matches!(err, Error::Inference(_)));
}

#[tokio::test]
async fn generate_empty_prompt_rejected_without_request() {
    let server = MockServer::start().await;
    let backend = backend_for(&server);

    let err = backend.generate("   ").await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}
