//! Tutoring conversations and their immutable messages.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ConversationId, MaterialId, MessageId, Owned, UserId};

/// Maximum conversation title length.
pub const TITLE_MAX: usize = 200;
/// Maximum message length accepted from users.
pub const MESSAGE_MAX: usize = 20_000;

/// Validation failures for conversation inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversationValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("message content must not be empty")]
    EmptyContent,
    #[error("message content must be at most {max} characters")]
    ContentTooLong { max: usize },
    #[error("unknown message role `{0}`")]
    UnknownRole(String),
    #[error("text must not contain NUL characters")]
    NulCharacter,
}

/// Stored text never contains NUL; Postgres `TEXT` and `JSONB` reject it.
pub(crate) fn has_nul(text: &str) -> bool {
    text.contains('\0')
}

/// Drop NUL characters from machine-produced text such as model replies.
pub(crate) fn strip_nul(text: &str) -> String {
    text.replace('\0', "")
}

/// Validate a title shared by conversations, mind maps and quizzes.
pub(crate) fn validate_title(raw: &str, max: usize) -> Result<String, ConversationValidationError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ConversationValidationError::EmptyTitle);
    }
    if has_nul(title) {
        return Err(ConversationValidationError::NulCharacter);
    }
    if title.chars().count() > max {
        return Err(ConversationValidationError::TitleTooLong { max });
    }
    Ok(title.to_owned())
}

/// Validated conversation title.
///
/// # Examples
/// ```
/// use study_assistant::domain::ConversationTitle;
///
/// assert_eq!(ConversationTitle::new("  Biology  ").unwrap().as_str(), "Biology");
/// assert!(ConversationTitle::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTitle(String);

impl ConversationTitle {
    pub fn new(raw: &str) -> Result<Self, ConversationValidationError> {
        validate_title(raw, TITLE_MAX).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl FromStr for MessageRole {
    type Err = ConversationValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(ConversationValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// Values needed to create a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConversation {
    pub user_id: UserId,
    pub title: ConversationTitle,
}

/// A named tutoring thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    pub user_id: UserId,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn from_draft(id: ConversationId, draft: NewConversation, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            title: draft.title.into_inner(),
            created_at,
        }
    }
}

impl Owned for Conversation {
    fn owner(&self) -> UserId {
        self.user_id
    }
}

/// Values needed to append a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub conversation_id: ConversationId,
    pub role: MessageRole,
    pub content: String,
    pub audio_url: Option<String>,
    pub material_ids: Vec<MaterialId>,
}

/// One immutable turn in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub material_ids: Vec<MaterialId>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn from_draft(id: MessageId, draft: NewMessage, created_at: DateTime<Utc>) -> Self {
        let NewMessage {
            conversation_id,
            role,
            content,
            audio_url,
            material_ids,
        } = draft;
        Self {
            id,
            conversation_id,
            role,
            content,
            audio_url,
            material_ids,
            created_at,
        }
    }
}

/// Validate user-authored message text.
pub fn validate_message_content(raw: &str) -> Result<String, ConversationValidationError> {
    if raw.trim().is_empty() {
        return Err(ConversationValidationError::EmptyContent);
    }
    if raw.chars().count() > MESSAGE_MAX {
        return Err(ConversationValidationError::ContentTooLong { max: MESSAGE_MAX });
    }
    if has_nul(raw) {
        return Err(ConversationValidationError::NulCharacter);
    }
    Ok(raw.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("   ", ConversationValidationError::EmptyTitle)]
    #[case("Bio\0logy", ConversationValidationError::NulCharacter)]
    fn rejects_unusable_titles(#[case] raw: &str, #[case] expected: ConversationValidationError) {
        assert_eq!(ConversationTitle::new(raw), Err(expected));
    }

    #[rstest]
    fn rejects_long_titles() {
        let raw = "x".repeat(TITLE_MAX + 1);
        assert_eq!(
            ConversationTitle::new(&raw),
            Err(ConversationValidationError::TitleTooLong { max: TITLE_MAX })
        );
    }

    #[rstest]
    fn message_content_keeps_whitespace() {
        assert_eq!(validate_message_content("  hi  "), Ok("  hi  ".to_owned()));
        assert_eq!(
            validate_message_content("\n"),
            Err(ConversationValidationError::EmptyContent)
        );
    }

    #[rstest]
    fn message_content_rejects_nul() {
        assert_eq!(
            validate_message_content("what is\0 ATP?"),
            Err(ConversationValidationError::NulCharacter)
        );
        assert_eq!(strip_nul("A\0TP"), "ATP");
    }

    #[rstest]
    fn message_serialises_with_camel_case_keys() {
        let message = Message::from_draft(
            MessageId::random(),
            NewMessage {
                conversation_id: ConversationId::random(),
                role: MessageRole::Assistant,
                content: "Chlorophyll absorbs light.".to_owned(),
                audio_url: None,
                material_ids: vec![],
            },
            Utc::now(),
        );
        let value = serde_json::to_value(&message).expect("serialise");
        assert_eq!(value["role"], "assistant");
        assert!(value.get("conversationId").is_some());
        assert!(value.get("audioUrl").is_none());
    }
}
