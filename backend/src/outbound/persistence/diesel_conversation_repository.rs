//! PostgreSQL-backed `ConversationRepository` implementation using Diesel ORM.
//!
//! Messages reference their conversation with `ON DELETE CASCADE`, so
//! deleting a conversation removes its history in the same statement.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ConversationRepository, RepositoryError};
use crate::domain::{
    Conversation, ConversationId, Message, MessageId, NewConversation, NewMessage, UserId,
};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::jsonb_columns::{decode, encode, parse};
use super::models::{ConversationRow, MessageRow, NewConversationRow, NewMessageRow};
use super::pool::DbPool;
use super::schema::{conversations, messages};

/// Diesel-backed implementation of the [`ConversationRepository`] port.
#[derive(Clone)]
pub struct DieselConversationRepository {
    pool: DbPool,
}

impl DieselConversationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_conversation(row: ConversationRow) -> Conversation {
    Conversation {
        id: ConversationId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        title: row.title,
        created_at: row.created_at,
    }
}

fn row_to_message(row: MessageRow) -> Result<Message, RepositoryError> {
    Ok(Message {
        id: MessageId::from_uuid(row.id),
        conversation_id: ConversationId::from_uuid(row.conversation_id),
        role: parse(&row.role, "role")?,
        content: row.content,
        audio_url: row.audio_url,
        material_ids: decode(row.material_ids, "material_ids")?,
        created_at: row.created_at,
    })
}

#[async_trait]
impl ConversationRepository for DieselConversationRepository {
    async fn create(&self, conversation: NewConversation) -> Result<Conversation, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewConversationRow {
            id: Uuid::new_v4(),
            user_id: *conversation.user_id.as_uuid(),
            title: conversation.title.as_str(),
        };

        let row: ConversationRow = diesel::insert_into(conversations::table)
            .values(&new_row)
            .returning(ConversationRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row_to_conversation(row))
    }

    async fn find_by_id(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ConversationRow> = conversations::table
            .filter(conversations::id.eq(id.as_uuid()))
            .select(ConversationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_conversation))
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Conversation>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ConversationRow> = conversations::table
            .filter(conversations::user_id.eq(user_id.as_uuid()))
            .order((conversations::created_at.desc(), conversations::seq.desc()))
            .select(ConversationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_conversation).collect())
    }

    async fn delete(&self, id: ConversationId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed =
            diesel::delete(conversations::table.filter(conversations::id.eq(id.as_uuid())))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn create_message(&self, message: NewMessage) -> Result<Message, RepositoryError> {
        let material_ids = encode(&message.material_ids, "material_ids")?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewMessageRow {
            id: Uuid::new_v4(),
            conversation_id: *message.conversation_id.as_uuid(),
            role: message.role.as_str(),
            content: &message.content,
            audio_url: message.audio_url.as_deref(),
            material_ids,
        };

        let row: MessageRow = diesel::insert_into(messages::table)
            .values(&new_row)
            .returning(MessageRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_message(row)
    }

    async fn list_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<MessageRow> = messages::table
            .filter(messages::conversation_id.eq(conversation_id.as_uuid()))
            .order((messages::created_at.asc(), messages::seq.asc()))
            .select(MessageRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_message).collect()
    }
}
