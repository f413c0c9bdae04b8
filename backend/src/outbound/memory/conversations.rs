//! In-memory `ConversationRepository`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{ConversationRepository, RepositoryError};
use crate::domain::{
    Conversation, ConversationId, Message, MessageId, NewConversation, NewMessage, UserId,
};

use super::{Table, lock, newest_first, oldest_first};

#[derive(Default)]
struct Tables {
    conversations: Table<ConversationId, Conversation>,
    messages: Table<MessageId, Message>,
}

/// Conversations and their messages share one lock so a delete removes both.
pub struct MemoryConversationRepository {
    tables: Mutex<Tables>,
    clock: Arc<dyn Clock>,
}

impl MemoryConversationRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            clock,
        }
    }
}

#[async_trait]
impl ConversationRepository for MemoryConversationRepository {
    async fn create(&self, conversation: NewConversation) -> Result<Conversation, RepositoryError> {
        let stored =
            Conversation::from_draft(ConversationId::random(), conversation, self.clock.utc());
        lock(&self.tables)?
            .conversations
            .insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        Ok(lock(&self.tables)?.conversations.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Conversation>, RepositoryError> {
        let tables = lock(&self.tables)?;
        Ok(newest_first(
            tables
                .conversations
                .values()
                .filter(|conversation| conversation.user_id == user_id)
                .cloned(),
            |conversation| conversation.created_at,
        ))
    }

    async fn delete(&self, id: ConversationId) -> Result<bool, RepositoryError> {
        let mut tables = lock(&self.tables)?;
        let removed = tables.conversations.remove(&id).is_some();
        if removed {
            tables
                .messages
                .retain(|message| message.conversation_id != id);
        }
        Ok(removed)
    }

    async fn create_message(&self, message: NewMessage) -> Result<Message, RepositoryError> {
        let mut tables = lock(&self.tables)?;
        if !tables.conversations.contains(&message.conversation_id) {
            return Err(RepositoryError::query("conversation does not exist"));
        }
        let stored = Message::from_draft(MessageId::random(), message, self.clock.utc());
        tables.messages.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let tables = lock(&self.tables)?;
        Ok(oldest_first(
            tables
                .messages
                .values()
                .filter(|message| message.conversation_id == conversation_id)
                .cloned(),
            |message| message.created_at,
        ))
    }
}
