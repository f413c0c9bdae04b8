//! Coverage for the chat-completions adapter against a local mock server.

use std::time::Duration;

use rstest::rstest;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::domain::ports::ChatMessage;

fn gateway(server: &MockServer, api_key: Option<&str>, timeout: Duration) -> HttpAiGateway {
    let base_url = Url::parse(&format!("{}/api/v1/", server.uri())).expect("mock server url");
    HttpAiGateway::new(HttpAiGatewaySettings {
        base_url,
        api_key: api_key.map(str::to_owned),
        models: AiModels {
            chat: "test/chat".to_owned(),
            vision: "test/vision".to_owned(),
            reasoning: "test/reasoning".to_owned(),
        },
        timeout,
    })
    .expect("client builds")
}

fn request(task: AiTask, json_output: bool) -> CompletionRequest {
    CompletionRequest {
        task,
        messages: vec![
            ChatMessage::system("You are a tutor."),
            ChatMessage::user("What is osmosis?"),
        ],
        json_output,
    }
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "gen-1",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    })
}

#[tokio::test]
async fn returns_first_choice_for_task_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "model": "test/chat" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Water moves.")))
        .expect(1)
        .mount(&server)
        .await;

    let reply = gateway(&server, Some("sk-test"), Duration::from_secs(5))
        .complete(request(AiTask::Chat, false))
        .await
        .expect("completion succeeds");

    assert_eq!(reply, "Water moves.");
}

#[tokio::test]
async fn structured_requests_ask_for_json_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(body_partial_json(json!({
            "model": "test/reasoning",
            "response_format": { "type": "json_object" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("{}")))
        .expect(1)
        .mount(&server)
        .await;

    let reply = gateway(&server, Some("sk-test"), Duration::from_secs(5))
        .complete(request(AiTask::Reasoning, true))
        .await
        .expect("completion succeeds");

    assert_eq!(reply, "{}");
}

#[tokio::test]
async fn non_success_status_carries_body_preview() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(502).set_body_string("{\"error\":\n  \"provider   down\"}"),
        )
        .mount(&server)
        .await;

    let error = gateway(&server, Some("sk-test"), Duration::from_secs(5))
        .complete(request(AiTask::Chat, false))
        .await
        .expect_err("status error");

    assert_eq!(
        error,
        AiGatewayError::status(502_u16, "{\"error\": \"provider down\"}")
    );
}

#[rstest]
#[case::no_choices(json!({ "choices": [] }))]
#[case::null_content(json!({ "choices": [{ "message": { "content": null } }] }))]
#[case::wrong_shape(json!({ "choices": "none" }))]
#[tokio::test]
async fn unusable_bodies_are_decode_errors(#[case] body: serde_json::Value) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let error = gateway(&server, Some("sk-test"), Duration::from_secs(5))
        .complete(request(AiTask::Chat, false))
        .await
        .expect_err("decode error");

    assert!(matches!(error, AiGatewayError::Decode { .. }));
}

#[tokio::test]
async fn slow_upstream_is_a_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("late"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let error = gateway(&server, Some("sk-test"), Duration::from_millis(50))
        .complete(request(AiTask::Chat, false))
        .await
        .expect_err("timeout");

    assert!(matches!(error, AiGatewayError::Timeout { .. }));
}

#[rstest]
#[case::absent(None)]
#[case::blank(Some("  "))]
#[tokio::test]
async fn missing_api_key_never_reaches_the_network(#[case] api_key: Option<&str>) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let error = gateway(&server, api_key, Duration::from_secs(5))
        .complete(request(AiTask::Vision, false))
        .await
        .expect_err("not configured");

    assert_eq!(error, AiGatewayError::NotConfigured);
}

#[test]
fn body_preview_is_bounded() {
    let preview = body_preview("x".repeat(400).as_bytes());
    assert_eq!(preview.chars().count(), 163);
    assert!(preview.ends_with("..."));
}
