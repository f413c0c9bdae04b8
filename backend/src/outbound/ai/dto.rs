//! Wire DTOs for the chat-completions API.
//!
//! Requests borrow from the domain `CompletionRequest`; responses decode only
//! the fields the adapter reads.

use serde::{Deserialize, Serialize};

use crate::domain::ports::ChatMessage;

#[derive(Debug, Serialize)]
pub(super) struct ChatCompletionRequestDto<'a> {
    pub(super) model: &'a str,
    pub(super) messages: Vec<MessageDto<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) response_format: Option<ResponseFormatDto>,
}

#[derive(Debug, Serialize)]
pub(super) struct MessageDto<'a> {
    role: &'static str,
    content: ContentDto<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ContentDto<'a> {
    Text(&'a str),
    Parts(Vec<PartDto<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum PartDto<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrlDto },
}

#[derive(Debug, Serialize)]
struct ImageUrlDto {
    url: String,
}

#[derive(Debug, Serialize)]
pub(super) struct ResponseFormatDto {
    #[serde(rename = "type")]
    kind: &'static str,
}

impl ResponseFormatDto {
    pub(super) const fn json_object() -> Self {
        Self {
            kind: "json_object",
        }
    }
}

impl<'a> From<&'a ChatMessage> for MessageDto<'a> {
    fn from(message: &'a ChatMessage) -> Self {
        let content = match &message.image {
            None => ContentDto::Text(&message.text),
            Some(image) => ContentDto::Parts(vec![
                PartDto::Text {
                    text: &message.text,
                },
                PartDto::ImageUrl {
                    image_url: ImageUrlDto {
                        url: image.data_url(),
                    },
                },
            ]),
        };
        Self {
            role: message.role.as_str(),
            content,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatCompletionResponseDto {
    #[serde(default)]
    choices: Vec<ChoiceDto>,
}

#[derive(Debug, Deserialize)]
struct ChoiceDto {
    message: ChoiceMessageDto,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessageDto {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionResponseDto {
    /// Text of the first choice.
    pub(super) fn into_first_text(self) -> Result<String, String> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| "response contained no choices".to_owned())?;
        choice
            .message
            .content
            .ok_or_else(|| "first choice carried no content".to_owned())
    }
}
