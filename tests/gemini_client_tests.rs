//! Wire-level tests for the Gemini client against a local mock server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gemchat::{ApiKey, CompletionGateway, GatewayError, GeminiClient};

const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new(
        ApiKey::parse("test-key").unwrap(),
        "gemini-1.5-flash",
        server.uri(),
    )
}

#[tokio::test]
async fn test_sends_prompt_with_key_header_and_returns_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "Hi"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "OK"}]},
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server).complete("Hi").await.unwrap();
    assert_eq!(reply, "OK");
}

#[tokio::test]
async fn test_provider_error_message_is_carried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).complete("Hi").await.unwrap_err();
    assert_eq!(
        err,
        GatewayError::provider(400, "API key not valid. Please pass a valid API key.")
    );
}

#[tokio::test]
async fn test_non_json_success_body_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).complete("Hi").await.unwrap_err();
    assert!(matches!(err, GatewayError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_blocked_prompt_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).complete("Hi").await.unwrap_err();
    assert!(matches!(err, GatewayError::Blocked(_)));
}

#[tokio::test]
async fn test_slow_provider_hits_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(json!({"candidates": []})),
        )
        .mount(&server)
        .await;

    let client = GeminiClient::with_timeout(
        ApiKey::parse("test-key").unwrap(),
        "gemini-1.5-flash",
        server.uri(),
        Duration::from_millis(200),
    );

    let err = client.complete("Hi").await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Nothing listens on port 1.
    let uri = "http://127.0.0.1:1";
    let client = GeminiClient::new(ApiKey::parse("test-key").unwrap(), "gemini-1.5-flash", uri);
    let err = client.complete("Hi").await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
}
