//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, hasher, tokens, AI gateway, text extraction)
//! are implemented by outbound adapters. Driving ports (the `*Service`
//! traits) are implemented by domain services and called by inbound
//! adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_service;
mod ai_gateway;
mod conversation_repository;
mod conversation_service;
mod credential_hasher;
mod material_repository;
mod material_service;
mod mind_map_repository;
mod mind_map_service;
mod quiz_repository;
mod quiz_service;
mod repository_error;
mod text_extractor;
mod token_service;
mod user_repository;

pub use account_service::AccountService;
#[cfg(test)]
pub use account_service::MockAccountService;
#[cfg(test)]
pub use ai_gateway::MockAiGateway;
pub(crate) use ai_gateway::map_gateway_error;
pub use ai_gateway::{
    AI_INVALID_RESPONSE, AI_REQUEST_FAILED, AiGateway, AiGatewayError, AiTask, ChatMessage,
    ChatRole, CompletionRequest, InlineImage,
};
pub use conversation_repository::ConversationRepository;
#[cfg(test)]
pub use conversation_repository::MockConversationRepository;
#[cfg(test)]
pub use conversation_service::MockConversationService;
pub use conversation_service::{ChatExchange, ConversationService, PostMessage};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHashError, CredentialHasher};
pub use material_repository::MaterialRepository;
#[cfg(test)]
pub use material_repository::MockMaterialRepository;
#[cfg(test)]
pub use material_service::MockMaterialService;
pub use material_service::{MaterialService, UploadedFile, YouTubeRequest};
pub use mind_map_repository::MindMapRepository;
#[cfg(test)]
pub use mind_map_repository::MockMindMapRepository;
#[cfg(test)]
pub use mind_map_service::MockMindMapService;
pub use mind_map_service::{CreateMindMap, GenerateMindMap, MindMapPatch, MindMapService};
#[cfg(test)]
pub use quiz_repository::MockQuizRepository;
pub use quiz_repository::QuizRepository;
#[cfg(test)]
pub use quiz_service::MockQuizService;
pub use quiz_service::{GenerateQuiz, QuizService};
pub(crate) use repository_error::map_repository_error;
pub use repository_error::RepositoryError;
#[cfg(test)]
pub use text_extractor::MockPdfTextExtractor;
pub use text_extractor::{PdfTextExtractor, TextExtractionError};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenError, TokenService};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::UserRepository;
