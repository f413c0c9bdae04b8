//! Reqwest-backed AI gateway adapter.
//!
//! This adapter owns transport details only: model selection per task,
//! request serialisation, timeout and HTTP error mapping, and decoding of the
//! first completion choice.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use zeroize::Zeroizing;

use super::dto::{
    ChatCompletionRequestDto, ChatCompletionResponseDto, MessageDto, ResponseFormatDto,
};
use crate::domain::ports::{AiGateway, AiGatewayError, AiTask, CompletionRequest};

const DEFAULT_CHAT_MODEL: &str = "openai/gpt-4o-mini";
const DEFAULT_VISION_MODEL: &str = "openai/gpt-4o-mini";
const DEFAULT_REASONING_MODEL: &str = "openai/gpt-4o";

/// Model identifiers per task class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiModels {
    pub chat: String,
    pub vision: String,
    pub reasoning: String,
}

impl AiModels {
    fn for_task(&self, task: AiTask) -> &str {
        match task {
            AiTask::Chat => &self.chat,
            AiTask::Vision => &self.vision,
            AiTask::Reasoning => &self.reasoning,
        }
    }
}

impl Default for AiModels {
    fn default() -> Self {
        Self {
            chat: DEFAULT_CHAT_MODEL.to_owned(),
            vision: DEFAULT_VISION_MODEL.to_owned(),
            reasoning: DEFAULT_REASONING_MODEL.to_owned(),
        }
    }
}

/// Connection settings for [`HttpAiGateway`].
pub struct HttpAiGatewaySettings {
    /// API root; `/chat/completions` is appended.
    pub base_url: Url,
    /// Bearer key. Without one every call fails with `NotConfigured`.
    pub api_key: Option<String>,
    pub models: AiModels,
    pub timeout: Duration,
}

/// AI gateway adapter performing chat-completion POSTs against one endpoint.
pub struct HttpAiGateway {
    client: Client,
    endpoint: String,
    api_key: Option<Zeroizing<String>>,
    models: AiModels,
}

impl HttpAiGateway {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(settings: HttpAiGatewaySettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        let endpoint = format!(
            "{}/chat/completions",
            settings.base_url.as_str().trim_end_matches('/')
        );
        Ok(Self {
            client,
            endpoint,
            api_key: settings
                .api_key
                .filter(|key| !key.trim().is_empty())
                .map(Zeroizing::new),
            models: settings.models,
        })
    }
}

#[async_trait]
impl AiGateway for HttpAiGateway {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AiGatewayError> {
        let Some(api_key) = self.api_key.as_ref() else {
            return Err(AiGatewayError::not_configured());
        };
        let model = self.models.for_task(request.task);
        let payload = ChatCompletionRequestDto {
            model,
            messages: request.messages.iter().map(MessageDto::from).collect(),
            response_format: request
                .json_output
                .then(ResponseFormatDto::json_object),
        };
        tracing::debug!(model, task = ?request.task, "sending completion request");

        let response = self
            .client
            .post(self.endpoint.as_str())
            .bearer_auth(api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_first_choice(body.as_ref())
    }
}

fn parse_first_choice(body: &[u8]) -> Result<String, AiGatewayError> {
    let decoded: ChatCompletionResponseDto = serde_json::from_slice(body).map_err(|error| {
        AiGatewayError::decode(format!("invalid completion JSON payload: {error}"))
    })?;
    decoded.into_first_text().map_err(AiGatewayError::decode)
}

fn map_transport_error(error: reqwest::Error) -> AiGatewayError {
    if error.is_timeout() {
        AiGatewayError::timeout(error.to_string())
    } else {
        AiGatewayError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> AiGatewayError {
    AiGatewayError::status(status.as_u16(), body_preview(body))
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
#[path = "http_gateway_tests.rs"]
mod tests;
