//! Driving port for tutoring conversations.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    Conversation, ConversationId, ConversationTitle, Error, MaterialId, Message, UserId,
};

/// A user turn to append to a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostMessage {
    pub content: String,
    pub material_ids: Vec<MaterialId>,
    pub audio_url: Option<String>,
}

/// Both halves of one exchange, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatExchange {
    pub user_message: Message,
    pub assistant_message: Message,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationService: Send + Sync {
    async fn list(&self, user_id: UserId) -> Result<Vec<Conversation>, Error>;

    async fn create(&self, user_id: UserId, title: ConversationTitle)
    -> Result<Conversation, Error>;

    async fn delete(&self, user_id: UserId, id: ConversationId) -> Result<(), Error>;

    async fn messages(&self, user_id: UserId, id: ConversationId) -> Result<Vec<Message>, Error>;

    /// Store the user turn, ask the chat model and store its reply.
    ///
    /// The user turn stays stored when the model call fails.
    async fn post_message(
        &self,
        user_id: UserId,
        id: ConversationId,
        message: PostMessage,
    ) -> Result<ChatExchange, Error>;
}
