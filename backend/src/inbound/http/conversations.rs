//! Tutoring conversation API handlers.
//!
//! ```text
//! GET /api/conversations
//! POST /api/conversations {"title":"Biology revision"}
//! DELETE /api/conversations/{id}
//! GET /api/conversations/{id}/messages
//! POST /api/conversations/{id}/messages {"content":"Explain osmosis","materialIds":[]}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{ChatExchange, PostMessage};
use crate::domain::{Conversation, ConversationId, ConversationTitle, Error, Message};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, parse_id, parse_material_ids};

const ID: FieldName = FieldName::new("id");
const TITLE: FieldName = FieldName::new("title");
const MATERIAL_IDS: FieldName = FieldName::new("materialIds");

/// Body for `POST /api/conversations`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationRequest {
    #[schema(example = "Biology revision")]
    pub title: String,
}

/// Body for `POST /api/conversations/{id}/messages`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    #[schema(example = "Explain osmosis in one paragraph")]
    pub content: String,
    /// Materials to use as tutoring context; each must belong to the caller.
    #[serde(default)]
    pub material_ids: Vec<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
}

impl TryFrom<PostMessageRequest> for PostMessage {
    type Error = Error;

    fn try_from(value: PostMessageRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            content: value.content,
            material_ids: parse_material_ids(value.material_ids, MATERIAL_IDS)?,
            audio_url: value.audio_url,
        })
    }
}

/// List the caller's conversations, newest first.
#[utoipa::path(
    get,
    path = "/api/conversations",
    responses(
        (status = 200, description = "Conversations", body = [Conversation]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["conversations"],
    operation_id = "listConversations"
)]
#[get("/conversations")]
pub async fn list_conversations(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<Conversation>>> {
    Ok(web::Json(state.conversations.list(user.id()).await?))
}

/// Start a new conversation.
#[utoipa::path(
    post,
    path = "/api/conversations",
    request_body = CreateConversationRequest,
    responses(
        (status = 201, description = "Conversation created", body = Conversation),
        (status = 400, description = "Invalid title", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["conversations"],
    operation_id = "createConversation"
)]
#[post("/conversations")]
pub async fn create_conversation(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    payload: web::Json<CreateConversationRequest>,
) -> ApiResult<HttpResponse> {
    let title = ConversationTitle::new(&payload.title)
        .map_err(|err| field_error(TITLE, "invalid_title", err))?;
    let conversation = state.conversations.create(user.id(), title).await?;
    Ok(HttpResponse::Created().json(conversation))
}

/// Delete a conversation together with its messages.
#[utoipa::path(
    delete,
    path = "/api/conversations/{id}",
    params(("id" = String, Path, description = "Conversation id")),
    responses(
        (status = 204, description = "Conversation deleted"),
        (status = 400, description = "Invalid id", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Conversation not found", body = Error)
    ),
    tags = ["conversations"],
    operation_id = "deleteConversation"
)]
#[delete("/conversations/{id}")]
pub async fn delete_conversation(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: ConversationId = parse_id(&path, ID)?;
    state.conversations.delete(user.id(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Messages of one conversation, oldest first.
#[utoipa::path(
    get,
    path = "/api/conversations/{id}/messages",
    params(("id" = String, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Messages", body = [Message]),
        (status = 400, description = "Invalid id", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Conversation not found", body = Error)
    ),
    tags = ["conversations"],
    operation_id = "listMessages"
)]
#[get("/conversations/{id}/messages")]
pub async fn list_messages(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Message>>> {
    let id: ConversationId = parse_id(&path, ID)?;
    Ok(web::Json(state.conversations.messages(user.id(), id).await?))
}

/// Send a message and receive the tutor's reply.
///
/// The user message is stored before the chat model is called, so it stays
/// stored even when the reply fails.
#[utoipa::path(
    post,
    path = "/api/conversations/{id}/messages",
    params(("id" = String, Path, description = "Conversation id")),
    request_body = PostMessageRequest,
    responses(
        (status = 201, description = "Stored user and assistant messages", body = ChatExchange),
        (status = 400, description = "Invalid message", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Conversation or material not found", body = Error),
        (status = 500, description = "AI service failure", body = Error)
    ),
    tags = ["conversations"],
    operation_id = "postMessage"
)]
#[post("/conversations/{id}/messages")]
pub async fn post_message(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<PostMessageRequest>,
) -> ApiResult<HttpResponse> {
    let id: ConversationId = parse_id(&path, ID)?;
    let message = PostMessage::try_from(payload.into_inner())?;
    let exchange = state
        .conversations
        .post_message(user.id(), id, message)
        .await?;
    Ok(HttpResponse::Created().json(exchange))
}

#[cfg(test)]
#[path = "conversations_tests.rs"]
mod tests;
