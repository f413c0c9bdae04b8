//! Conversation domain service.
//!
//! Posting a message stores the user turn first, then asks the chat model
//! with the referenced materials as context and stores the reply. There is
//! no compensation: a failed model call leaves the user turn in place.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use crate::domain::conversation::strip_nul;
use crate::domain::material_refs::resolve_materials;
use crate::domain::ports::{
    AI_INVALID_RESPONSE, AiGateway, AiTask, ChatExchange, ChatMessage, CompletionRequest,
    ConversationRepository, ConversationService, MaterialRepository, PostMessage,
    map_gateway_error, map_repository_error,
};
use crate::domain::prompts::{HISTORY_TURNS, tutor_system_prompt};
use crate::domain::{
    Conversation, ConversationId, ConversationTitle, Error, Message, MessageRole,
    NewConversation, NewMessage, UserId, require_owned, validate_message_content,
};

const AUDIO_URL_MAX: usize = 2_048;

fn history_message(message: &Message) -> ChatMessage {
    match message.role {
        MessageRole::User => ChatMessage::user(message.content.clone()),
        MessageRole::Assistant => ChatMessage::assistant(message.content.clone()),
    }
}

fn clean_audio_url(raw: Option<String>) -> Result<Option<String>, Error> {
    let Some(url) = raw.map(|url| url.trim().to_owned()).filter(|url| !url.is_empty()) else {
        return Ok(None);
    };
    if url.len() > AUDIO_URL_MAX {
        return Err(Error::invalid_request("audio url is too long")
            .with_details(json!({ "field": "audioUrl", "code": "too_long" })));
    }
    Ok(Some(url))
}

/// Conversation service implementing the [`ConversationService`] driving port.
#[derive(Clone)]
pub struct ConversationServiceImpl<C, M, A> {
    conversations: Arc<C>,
    materials: Arc<M>,
    ai: Arc<A>,
}

impl<C, M, A> ConversationServiceImpl<C, M, A> {
    pub fn new(conversations: Arc<C>, materials: Arc<M>, ai: Arc<A>) -> Self {
        Self {
            conversations,
            materials,
            ai,
        }
    }
}

impl<C, M, A> ConversationServiceImpl<C, M, A>
where
    C: ConversationRepository,
    M: MaterialRepository,
    A: AiGateway,
{
    async fn owned(&self, user_id: UserId, id: ConversationId) -> Result<Conversation, Error> {
        let found = self
            .conversations
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?;
        require_owned(found, user_id, "conversation")
    }
}

#[async_trait]
impl<C, M, A> ConversationService for ConversationServiceImpl<C, M, A>
where
    C: ConversationRepository,
    M: MaterialRepository,
    A: AiGateway,
{
    async fn list(&self, user_id: UserId) -> Result<Vec<Conversation>, Error> {
        self.conversations
            .list_for_user(user_id)
            .await
            .map_err(map_repository_error)
    }

    async fn create(
        &self,
        user_id: UserId,
        title: ConversationTitle,
    ) -> Result<Conversation, Error> {
        self.conversations
            .create(NewConversation { user_id, title })
            .await
            .map_err(map_repository_error)
    }

    async fn delete(&self, user_id: UserId, id: ConversationId) -> Result<(), Error> {
        self.owned(user_id, id).await?;
        self.conversations
            .delete(id)
            .await
            .map_err(map_repository_error)?;
        Ok(())
    }

    async fn messages(&self, user_id: UserId, id: ConversationId) -> Result<Vec<Message>, Error> {
        self.owned(user_id, id).await?;
        self.conversations
            .list_messages(id)
            .await
            .map_err(map_repository_error)
    }

    async fn post_message(
        &self,
        user_id: UserId,
        id: ConversationId,
        message: PostMessage,
    ) -> Result<ChatExchange, Error> {
        let PostMessage {
            content,
            material_ids,
            audio_url,
        } = message;
        let content = validate_message_content(&content).map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": "content", "code": "invalid_content" }))
        })?;
        let audio_url = clean_audio_url(audio_url)?;
        self.owned(user_id, id).await?;
        let materials = resolve_materials(self.materials.as_ref(), user_id, &material_ids).await?;
        let material_ids: Vec<_> = materials.iter().map(|material| material.id).collect();

        let history = self
            .conversations
            .list_messages(id)
            .await
            .map_err(map_repository_error)?;

        let user_message = self
            .conversations
            .create_message(NewMessage {
                conversation_id: id,
                role: MessageRole::User,
                content: content.clone(),
                audio_url,
                material_ids: material_ids.clone(),
            })
            .await
            .map_err(map_repository_error)?;

        let mut prompt = Vec::with_capacity(HISTORY_TURNS + 2);
        prompt.push(ChatMessage::system(tutor_system_prompt(&materials)));
        let skip = history.len().saturating_sub(HISTORY_TURNS);
        prompt.extend(history.iter().skip(skip).map(history_message));
        prompt.push(ChatMessage::user(content));

        let reply = self
            .ai
            .complete(CompletionRequest {
                task: AiTask::Chat,
                messages: prompt,
                json_output: false,
            })
            .await
            .map_err(map_gateway_error)?;
        let reply = strip_nul(&reply);
        let reply = reply.trim();
        if reply.is_empty() {
            warn!(conversation_id = %id, "chat model returned an empty reply");
            return Err(Error::upstream(AI_INVALID_RESPONSE));
        }

        let assistant_message = self
            .conversations
            .create_message(NewMessage {
                conversation_id: id,
                role: MessageRole::Assistant,
                content: reply.to_owned(),
                audio_url: None,
                material_ids,
            })
            .await
            .map_err(map_repository_error)?;

        Ok(ChatExchange {
            user_message,
            assistant_message,
        })
    }
}

#[cfg(test)]
#[path = "conversation_service_tests.rs"]
mod tests;
