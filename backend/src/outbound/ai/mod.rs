//! AI gateway outbound adapter.
//!
//! Talks to an OpenAI-compatible chat-completions endpoint (OpenRouter by
//! default) and implements the `AiGateway` port.

mod dto;
mod http_gateway;

pub use http_gateway::{AiModels, HttpAiGateway, HttpAiGatewaySettings};
