mod common;

use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;
use sefer_store::config::VisionConfig;
use sefer_store::domain::DomainError;
use sefer_store::server::build_router;
use sefer_store::services::vision_service::VisionClient;

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

// Smallest valid JPEG header bytes; the mock never decodes them
const FAKE_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

fn client_for(server: &MockServer) -> VisionClient {
    VisionClient::new(VisionConfig {
        api_key: "test-key".to_string(),
        api_url: format!("{}{}", server.uri(), COMPLETIONS_PATH),
        model: "test-model".to_string(),
    })
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn test_suggestion_from_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"title": "משנה ברורה", "author": "החפץ חיים", "language": "he", "isbn": ""}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let suggestion = client_for(&server)
        .suggest_book_fields(FAKE_JPEG, "image/jpeg")
        .await
        .unwrap();

    assert_eq!(suggestion.title.as_deref(), Some("משנה ברורה"));
    assert_eq!(suggestion.author.as_deref(), Some("החפץ חיים"));
    assert_eq!(suggestion.language.as_deref(), Some("he"));
    assert_eq!(suggestion.isbn, None);
}

#[tokio::test]
async fn test_upstream_failure_is_external_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .suggest_book_fields(FAKE_JPEG, "image/jpeg")
        .await;
    assert!(matches!(result, Err(DomainError::External(_))));
}

#[tokio::test]
async fn test_non_json_answer_is_external_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("I cannot read this.")))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .suggest_book_fields(FAKE_JPEG, "image/jpeg")
        .await;
    assert!(matches!(result, Err(DomainError::External(_))));
}

#[tokio::test]
async fn test_analyze_endpoint_without_configuration() {
    let (state, app) = setup().await;
    let cookie = admin_cookie(&state, &app).await;

    let (status, _) = send(
        &app,
        multipart_request("/api/analyze-image", Some(&cookie), "image", "image/jpeg", FAKE_JPEG),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_analyze_endpoint_returns_suggestion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "```json\n{\"title\": \"Siddur Tehillat Hashem\", \"publisher\": \"Kehot\"}\n```",
        )))
        .mount(&server)
        .await;

    let (state, _) = setup().await;
    let state = state.with_vision(client_for(&server));
    let app = build_router(state.clone());
    let cookie = admin_cookie(&state, &app).await;

    let (status, body) = send(
        &app,
        multipart_request("/api/analyze-image", Some(&cookie), "image", "image/jpeg", FAKE_JPEG),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["title"], json!("Siddur Tehillat Hashem"));
    assert_eq!(body["publisher"], json!("Kehot"));
    assert_eq!(body["author"], json!(null));

    let customer = user_cookie(&state, &app).await;
    let (status, _) = send(
        &app,
        multipart_request("/api/analyze-image", Some(&customer), "image", "image/jpeg", FAKE_JPEG),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
