//! Port for the third-party multi-model completion service.
//!
//! The domain asks for a task class rather than a model name; adapters map
//! each class to a configured model identifier.

use async_trait::async_trait;

use crate::domain::Error;

use super::define_port_error;

/// Kind of work a completion is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AiTask {
    /// Conversational tutoring replies.
    Chat,
    /// Image description.
    Vision,
    /// Structured generation of mind maps and quizzes.
    Reasoning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Base64 image data attached to a user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime: String,
    pub data_base64: String,
}

impl InlineImage {
    /// Render as a `data:` URL.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.data_base64)
    }
}

/// One role-tagged turn sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub image: Option<InlineImage>,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            text: text.into(),
            image: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            image: None,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.image = Some(image);
        self
    }
}

/// A completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub task: AiTask,
    pub messages: Vec<ChatMessage>,
    /// Ask the model for a JSON object reply.
    pub json_output: bool,
}

define_port_error! {
    /// Failures raised by AI gateway adapters.
    pub enum AiGatewayError {
        /// No API key was configured.
        NotConfigured => "AI gateway is not configured",
        /// The request never produced an HTTP response.
        Transport { message: String } => "AI gateway transport failed: {message}",
        /// The request exceeded the client timeout.
        Timeout { message: String } => "AI gateway timed out: {message}",
        /// The gateway answered with a non-success status.
        Status { status: u16, body: String } => "AI gateway returned status {status}: {body}",
        /// The response body could not be understood.
        Decode { message: String } => "AI gateway response was unreadable: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AiGateway: Send + Sync {
    /// Return the text of the first completion choice.
    async fn complete(&self, request: CompletionRequest) -> Result<String, AiGatewayError>;
}

/// Translate a gateway failure into the client-facing upstream error.
pub(crate) fn map_gateway_error(error: AiGatewayError) -> Error {
    match &error {
        AiGatewayError::Status { status, .. } => {
            tracing::warn!(status, error = %error, "AI gateway rejected request");
        }
        AiGatewayError::NotConfigured => {
            tracing::error!("AI gateway called without an API key");
        }
        _ => tracing::warn!(error = %error, "AI gateway request failed"),
    }
    Error::upstream(AI_REQUEST_FAILED)
}

/// Message returned when the gateway call itself fails.
pub const AI_REQUEST_FAILED: &str = "AI service request failed";
/// Message returned when the gateway answers with unusable output.
pub const AI_INVALID_RESPONSE: &str = "AI service returned an invalid response";
