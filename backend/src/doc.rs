//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every `/api` handler and the health probes. Domain
//! entities derive `ToSchema` directly, so the document always matches the
//! JSON the handlers emit. Two security schemes are declared because the
//! auth mechanism is chosen at startup: a `session` cookie or an HS256
//! bearer token.

use utoipa::openapi::security::{
    ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme,
};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::ChatExchange;
use crate::domain::{
    Conversation, Difficulty, Error, ErrorCode, Material, MaterialType, Message, MessageRole,
    MindMap, MindMapConnection, MindMapNode, NodePosition, Plan, Question, QuestionType, Quiz,
    QuizAttempt, UserRole,
};
use crate::inbound::http::conversations::{CreateConversationRequest, PostMessageRequest};
use crate::inbound::http::health::{ProbeBody, ProbeStatus};
use crate::inbound::http::materials::{UploadForm, YouTubeMaterialRequest};
use crate::inbound::http::mind_maps::{
    CreateMindMapRequest, GenerateMindMapRequest, UpdateMindMapRequest,
};
use crate::inbound::http::quizzes::{GenerateQuizRequest, SubmitAttemptRequest};
use crate::inbound::http::session::SESSION_COOKIE;
use crate::inbound::http::users::{
    AuthResponse, LoginRequest, RegisterRequest, UpdateUserRequest, UserResponse,
};

/// Name of the cookie security scheme.
pub const SESSION_SCHEME: &str = "SessionCookie";
/// Name of the bearer token security scheme.
pub const BEARER_SCHEME: &str = "BearerAuth";

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            SESSION_SCHEME,
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                SESSION_COOKIE,
                "Session cookie set by POST /api/login when auth_mode is session.",
            ))),
        );
        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Token returned by POST /api/login when auth_mode is token.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API, served by Swagger UI in debug builds.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Study assistant API",
        description = "Materials, AI tutoring chat, mind maps and quizzes for a study PWA."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = []), ("BearerAuth" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_current_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::materials::list_materials,
        crate::inbound::http::materials::get_material,
        crate::inbound::http::materials::upload_material,
        crate::inbound::http::materials::add_youtube_material,
        crate::inbound::http::materials::delete_material,
        crate::inbound::http::conversations::list_conversations,
        crate::inbound::http::conversations::create_conversation,
        crate::inbound::http::conversations::delete_conversation,
        crate::inbound::http::conversations::list_messages,
        crate::inbound::http::conversations::post_message,
        crate::inbound::http::mind_maps::list_mind_maps,
        crate::inbound::http::mind_maps::create_mind_map,
        crate::inbound::http::mind_maps::generate_mind_map,
        crate::inbound::http::mind_maps::get_mind_map,
        crate::inbound::http::mind_maps::update_mind_map,
        crate::inbound::http::mind_maps::delete_mind_map,
        crate::inbound::http::quizzes::list_quizzes,
        crate::inbound::http::quizzes::get_quiz,
        crate::inbound::http::quizzes::generate_quiz,
        crate::inbound::http::quizzes::submit_attempt,
        crate::inbound::http::quizzes::list_attempts,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        UserResponse,
        AuthResponse,
        Plan,
        UserRole,
        RegisterRequest,
        LoginRequest,
        UpdateUserRequest,
        Material,
        MaterialType,
        UploadForm,
        YouTubeMaterialRequest,
        Conversation,
        Message,
        MessageRole,
        ChatExchange,
        CreateConversationRequest,
        PostMessageRequest,
        MindMap,
        MindMapNode,
        MindMapConnection,
        NodePosition,
        CreateMindMapRequest,
        GenerateMindMapRequest,
        UpdateMindMapRequest,
        Quiz,
        Question,
        QuestionType,
        Difficulty,
        QuizAttempt,
        GenerateQuizRequest,
        SubmitAttemptRequest,
        ProbeBody,
        ProbeStatus,
    )),
    tags(
        (name = "users", description = "Registration, login and profiles"),
        (name = "materials", description = "Uploaded study materials"),
        (name = "conversations", description = "Tutoring chat"),
        (name = "mindmaps", description = "Mind maps drawn or generated from materials"),
        (name = "quizzes", description = "Generated quizzes and graded attempts"),
        (name = "health", description = "Orchestration probes")
    )
)]
pub struct ApiDoc;
