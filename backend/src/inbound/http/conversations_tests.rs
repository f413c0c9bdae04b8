//! Tests for conversation API handlers.

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use chrono::Utc;
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::{
    MaterialId, MessageId, MessageRole, NewConversation, NewMessage, UserId,
};
use crate::inbound::http::test_utils::{MockPorts, call_api, signed_in};

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_conversations)
        .service(create_conversation)
        .service(delete_conversation)
        .service(list_messages)
        .service(post_message);
}

#[fixture]
fn owner() -> UserId {
    UserId::random()
}

fn message(conversation: ConversationId, role: MessageRole, content: &str) -> Message {
    Message::from_draft(
        MessageId::random(),
        NewMessage {
            conversation_id: conversation,
            role,
            content: content.to_owned(),
            audio_url: None,
            material_ids: Vec::new(),
        },
        Utc::now(),
    )
}

#[rstest]
#[actix_web::test]
async fn create_trims_title(owner: UserId) {
    let mut ports = MockPorts::default();
    ports
        .conversations
        .expect_create()
        .withf(|_, title| title.as_str() == "Biology")
        .return_once(move |user, title| {
            Ok(Conversation::from_draft(
                ConversationId::random(),
                NewConversation {
                    user_id: user,
                    title,
                },
                Utc::now(),
            ))
        });
    let state = ports.into_state(signed_in(owner));

    let (status, body) = call_api(
        state,
        routes,
        TestRequest::post()
            .uri("/api/conversations")
            .set_json(json!({ "title": "  Biology " })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Biology");
    assert_eq!(body["userId"], owner.to_string());
}

#[rstest]
#[actix_web::test]
async fn blank_title_is_rejected(owner: UserId) {
    let mut ports = MockPorts::default();
    ports.conversations.expect_create().never();
    let state = ports.into_state(signed_in(owner));

    let (status, body) = call_api(
        state,
        routes,
        TestRequest::post()
            .uri("/api/conversations")
            .set_json(json!({ "title": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "title");
}

#[rstest]
#[actix_web::test]
async fn missing_title_is_invalid_json(owner: UserId) {
    let state = MockPorts::default().into_state(signed_in(owner));

    let (status, body) = call_api(
        state,
        routes,
        TestRequest::post()
            .uri("/api/conversations")
            .set_json(json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[rstest]
#[actix_web::test]
async fn post_message_returns_both_turns(owner: UserId) {
    let conversation = ConversationId::random();
    let material = MaterialId::random();
    let mut ports = MockPorts::default();
    ports
        .conversations
        .expect_post_message()
        .withf(move |user, id, posted| {
            *user == owner
                && *id == conversation
                && posted.content == "Explain osmosis"
                && posted.material_ids == vec![material]
        })
        .return_once(move |_, id, _| {
            Ok(ChatExchange {
                user_message: message(id, MessageRole::User, "Explain osmosis"),
                assistant_message: message(id, MessageRole::Assistant, "Water moves."),
            })
        });
    let state = ports.into_state(signed_in(owner));

    let (status, body) = call_api(
        state,
        routes,
        TestRequest::post()
            .uri(&format!("/api/conversations/{conversation}/messages"))
            .set_json(json!({
                "content": "Explain osmosis",
                "materialIds": [material.to_string()]
            })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["userMessage"]["role"], "user");
    assert_eq!(body["assistantMessage"]["role"], "assistant");
    assert_eq!(body["assistantMessage"]["content"], "Water moves.");
}

#[rstest]
#[actix_web::test]
async fn malformed_material_id_is_rejected(owner: UserId) {
    let mut ports = MockPorts::default();
    ports.conversations.expect_post_message().never();
    let state = ports.into_state(signed_in(owner));

    let (status, body) = call_api(
        state,
        routes,
        TestRequest::post()
            .uri(&format!(
                "/api/conversations/{}/messages",
                ConversationId::random()
            ))
            .set_json(json!({ "content": "Hi", "materialIds": ["nope"] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "materialIds");
    assert_eq!(body["details"]["index"], 0);
}

#[rstest]
#[actix_web::test]
async fn ai_failure_surfaces_as_upstream_error(owner: UserId) {
    let mut ports = MockPorts::default();
    ports
        .conversations
        .expect_post_message()
        .return_once(|_, _, _| Err(Error::upstream("AI service request failed")));
    let state = ports.into_state(signed_in(owner));

    let (status, body) = call_api(
        state,
        routes,
        TestRequest::post()
            .uri(&format!(
                "/api/conversations/{}/messages",
                ConversationId::random()
            ))
            .set_json(json!({ "content": "Hi" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "upstream_error");
    assert_eq!(body["message"], "AI service request failed");
}

#[rstest]
#[actix_web::test]
async fn messages_are_returned_in_service_order(owner: UserId) {
    let conversation = ConversationId::random();
    let mut ports = MockPorts::default();
    ports.conversations.expect_messages().return_once(move |_, id| {
        Ok(vec![
            message(id, MessageRole::User, "first"),
            message(id, MessageRole::Assistant, "second"),
        ])
    });
    let state = ports.into_state(signed_in(owner));

    let (status, body) = call_api(
        state,
        routes,
        TestRequest::get().uri(&format!("/api/conversations/{conversation}/messages")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let contents: Vec<&str> = body
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|item| item["content"].as_str())
        .collect();
    assert_eq!(contents, ["first", "second"]);
}

#[rstest]
#[actix_web::test]
async fn deleting_foreign_conversation_is_not_found(owner: UserId) {
    let mut ports = MockPorts::default();
    ports
        .conversations
        .expect_delete()
        .return_once(|_, _| Err(Error::not_found("conversation not found")));
    let state = ports.into_state(signed_in(owner));

    let (status, _) = call_api(
        state,
        routes,
        TestRequest::delete().uri(&format!("/api/conversations/{}", ConversationId::random())),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
