//! Port abstraction for conversations and their messages.

use async_trait::async_trait;

use crate::domain::{
    Conversation, ConversationId, Message, NewConversation, NewMessage, UserId,
};

use super::RepositoryError;

/// Storage for conversations.
///
/// Messages belong to exactly one conversation and disappear with it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn create(&self, conversation: NewConversation)
    -> Result<Conversation, RepositoryError>;

    async fn find_by_id(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError>;

    /// Conversations owned by `user_id`, newest first.
    async fn list_for_user(&self, user_id: UserId)
    -> Result<Vec<Conversation>, RepositoryError>;

    /// Remove a conversation and all of its messages.
    async fn delete(&self, id: ConversationId) -> Result<bool, RepositoryError>;

    /// Append a message, assigning its id and timestamp.
    async fn create_message(&self, message: NewMessage) -> Result<Message, RepositoryError>;

    /// Messages of a conversation, oldest first with insertion order
    /// breaking timestamp ties.
    async fn list_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, RepositoryError>;
}
