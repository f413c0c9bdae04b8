//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. JSONB columns travel as
//! `serde_json::Value`; the repositories encode and decode them.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use super::schema::{
    conversations, materials, messages, mind_maps, quiz_attempts, quizzes, sessions, users,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub plan: String,
    pub role: String,
    pub locale: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub plan: &'a str,
    pub role: &'a str,
    pub locale: &'a str,
}

/// Profile changeset; `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserUpdate<'a> {
    pub email: Option<&'a str>,
    pub locale: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Materials
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = materials)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MaterialRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    pub material_type: String,
    pub content: String,
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = materials)]
pub(crate) struct NewMaterialRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: &'a str,
    pub material_type: &'a str,
    pub content: &'a str,
    pub source_url: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Conversations and messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = conversations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ConversationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = conversations)]
pub(crate) struct NewConversationRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MessageRow {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: String,
    pub content: String,
    pub audio_url: Option<String>,
    pub material_ids: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = messages)]
pub(crate) struct NewMessageRow<'a> {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: &'a str,
    pub content: &'a str,
    pub audio_url: Option<&'a str>,
    pub material_ids: Value,
}

// ---------------------------------------------------------------------------
// Mind maps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = mind_maps)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MindMapRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub nodes: Value,
    pub connections: Value,
    pub material_ids: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = mind_maps)]
pub(crate) struct NewMindMapRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: &'a str,
    pub nodes: Value,
    pub connections: Value,
    pub material_ids: Value,
}

/// Partial mind-map change; `updated_at` is set alongside it.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = mind_maps)]
pub(crate) struct MindMapUpdate<'a> {
    pub title: Option<&'a str>,
    pub nodes: Option<Value>,
    pub connections: Option<Value>,
}

// ---------------------------------------------------------------------------
// Quizzes and attempts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = quizzes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct QuizRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub difficulty: String,
    pub questions: Value,
    pub material_ids: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = quizzes)]
pub(crate) struct NewQuizRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: &'a str,
    pub difficulty: &'a str,
    pub questions: Value,
    pub material_ids: Value,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = quiz_attempts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AttemptRow {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub user_id: Uuid,
    pub answers: Value,
    pub score: i32,
    pub total_questions: i32,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = quiz_attempts)]
pub(crate) struct NewAttemptRow {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub user_id: Uuid,
    pub answers: Value,
    pub score: i32,
    pub total_questions: i32,
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sessions)]
pub(crate) struct NewSessionRow<'a> {
    pub session_key: &'a str,
    pub state: Value,
    pub expires_at: DateTime<Utc>,
}
