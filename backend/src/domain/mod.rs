//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed entities shared by the HTTP and storage
//! adapters, the ports those adapters plug into, and the services that
//! implement each use-case. Types validate on construction so handlers and
//! stores can rely on their invariants.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifier.
//! - User, Material, Conversation, Message, MindMap, Quiz, QuizAttempt:
//!   stored entities, each owned by one user except `User`.
//! - `*ServiceImpl`: driving-port implementations over the repository ports.

pub mod account_service;
pub mod auth;
pub mod conversation;
pub mod conversation_service;
pub mod error;
pub mod generation;
pub mod ids;
pub mod material;
mod material_refs;
pub mod material_service;
pub mod mind_map;
pub mod mind_map_service;
pub mod ownership;
pub mod ports;
mod prompts;
pub mod quiz;
pub mod quiz_service;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountServiceImpl;
pub use self::auth::{
    LoginCredentials, LoginValidationError, PASSWORD_MIN, Registration,
    RegistrationValidationError,
};
pub use self::conversation::{
    Conversation, ConversationTitle, ConversationValidationError, MESSAGE_MAX, Message,
    MessageRole, NewConversation, NewMessage, TITLE_MAX, validate_message_content,
};
pub use self::conversation_service::ConversationServiceImpl;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::generation::{
    GeneratedMindMap, GeneratedQuiz, GenerationError, parse_mind_map_reply, parse_quiz_reply,
    strip_code_fence,
};
pub use self::ids::{
    AttemptId, ConversationId, MaterialId, MessageId, MindMapId, QuizId, UserId,
};
pub use self::material::{
    FILENAME_MAX, Material, MaterialType, MaterialValidationError, NewMaterial, YouTubeLink,
    clean_filename,
};
pub use self::material_service::MaterialServiceImpl;
pub use self::mind_map::{
    MAX_CONNECTIONS, MAX_NODES, MIND_MAP_TITLE_MAX, MindMap, MindMapChanges, MindMapConnection,
    MindMapGraph, MindMapNode, MindMapValidationError, NewMindMap, NodePosition, mind_map_title,
};
pub use self::mind_map_service::MindMapServiceImpl;
pub use self::ownership::{Owned, owned_by, require_owned};
pub use self::quiz::{
    DEFAULT_QUESTION_COUNT, Difficulty, MAX_QUESTION_COUNT, MIN_QUESTION_COUNT, NewAttempt,
    NewQuiz, Question, QuestionSet, QuestionType, Quiz, QuizAttempt, QuizValidationError,
    question_count, quiz_title, score_answers, validate_answers,
};
pub use self::quiz_service::QuizServiceImpl;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    DEFAULT_LOCALE, EmailAddress, Locale, NewUser, Plan, User, UserChanges, UserRole,
    UserValidationError, Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use study_assistant::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
