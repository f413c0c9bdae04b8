//! Builders wiring repositories, outbound adapters and services into the
//! HTTP state.
//!
//! Storage and auth are chosen here, once; nothing downstream branches on
//! either.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::info;

use crate::domain::ports::{
    AiGateway, ConversationRepository, MaterialRepository, MindMapRepository, QuizRepository,
    TokenError, UserRepository,
};
use crate::domain::{
    AccountServiceImpl, ConversationServiceImpl, MaterialServiceImpl, MindMapServiceImpl,
    QuizServiceImpl,
};
use crate::inbound::http::auth::{AuthStrategy, SessionAuth, TokenAuth};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::ai::{HttpAiGateway, HttpAiGatewaySettings};
use crate::outbound::extraction::LopdfTextExtractor;
use crate::outbound::memory::{
    MemoryConversationRepository, MemoryMaterialRepository, MemoryMindMapRepository,
    MemoryQuizRepository, MemoryUserRepository,
};
use crate::outbound::persistence::{
    DbPool, DieselConversationRepository, DieselMaterialRepository, DieselMindMapRepository,
    DieselQuizRepository, DieselSessionStore, DieselUserRepository, MigrationError, PoolConfig,
    PoolError, run_migrations,
};
use crate::outbound::security::{Argon2CredentialHasher, JwtTokenService};
use crate::outbound::sessions::{MemorySessionStore, SessionBackend};

use super::config::{AppConfig, AuthMode, ConfigError, StorageMode};

/// Failures that stop the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Migration(#[from] MigrationError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("failed to build AI gateway client: {0}")]
    AiClient(#[from] reqwest::Error),
    #[error("failed to configure bearer tokens: {0}")]
    Token(#[from] TokenError),
}

/// One repository per entity, all backed by the same storage.
pub struct Repositories<U, M, C, N, Q> {
    pub users: Arc<U>,
    pub materials: Arc<M>,
    pub conversations: Arc<C>,
    pub mind_maps: Arc<N>,
    pub quizzes: Arc<Q>,
}

pub type MemoryRepositories = Repositories<
    MemoryUserRepository,
    MemoryMaterialRepository,
    MemoryConversationRepository,
    MemoryMindMapRepository,
    MemoryQuizRepository,
>;

pub type DieselRepositories = Repositories<
    DieselUserRepository,
    DieselMaterialRepository,
    DieselConversationRepository,
    DieselMindMapRepository,
    DieselQuizRepository,
>;

impl MemoryRepositories {
    pub fn memory(clock: &Arc<dyn Clock>) -> Self {
        Self {
            users: Arc::new(MemoryUserRepository::new(clock.clone())),
            materials: Arc::new(MemoryMaterialRepository::new(clock.clone())),
            conversations: Arc::new(MemoryConversationRepository::new(clock.clone())),
            mind_maps: Arc::new(MemoryMindMapRepository::new(clock.clone())),
            quizzes: Arc::new(MemoryQuizRepository::new(clock.clone())),
        }
    }
}

impl DieselRepositories {
    pub fn postgres(pool: &DbPool) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            materials: Arc::new(DieselMaterialRepository::new(pool.clone())),
            conversations: Arc::new(DieselConversationRepository::new(pool.clone())),
            mind_maps: Arc::new(DieselMindMapRepository::new(pool.clone())),
            quizzes: Arc::new(DieselQuizRepository::new(pool.clone())),
        }
    }
}

/// Build every driving port over the given repositories and AI gateway.
pub fn service_ports<U, M, C, N, Q, A>(repos: Repositories<U, M, C, N, Q>, ai: Arc<A>) -> HttpStatePorts
where
    U: UserRepository + 'static,
    M: MaterialRepository + 'static,
    C: ConversationRepository + 'static,
    N: MindMapRepository + 'static,
    Q: QuizRepository + 'static,
    A: AiGateway + 'static,
{
    let Repositories {
        users,
        materials,
        conversations,
        mind_maps,
        quizzes,
    } = repos;
    HttpStatePorts {
        accounts: Arc::new(AccountServiceImpl::new(
            users,
            Arc::new(Argon2CredentialHasher),
        )),
        materials: Arc::new(MaterialServiceImpl::new(
            materials.clone(),
            ai.clone(),
            Arc::new(LopdfTextExtractor),
        )),
        conversations: Arc::new(ConversationServiceImpl::new(
            conversations,
            materials.clone(),
            ai.clone(),
        )),
        mind_maps: Arc::new(MindMapServiceImpl::new(mind_maps, materials.clone(), ai.clone())),
        quizzes: Arc::new(QuizServiceImpl::new(quizzes, materials, ai)),
    }
}

/// Auth strategy for the configured mode.
///
/// # Errors
///
/// Token mode fails without a usable signing secret.
pub fn auth_strategy(
    config: &AppConfig,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn AuthStrategy>, StartupError> {
    match config.auth_mode()? {
        AuthMode::Session => Ok(Arc::new(SessionAuth)),
        AuthMode::Token => {
            let tokens = JwtTokenService::new(config.token_secret()?, clock)?;
            Ok(Arc::new(TokenAuth::new(Arc::new(tokens))))
        }
    }
}

/// Everything the HTTP server needs besides cookie settings.
pub struct BuiltState {
    pub http_state: web::Data<HttpState>,
    /// Present only in session auth mode.
    pub sessions: Option<SessionBackend>,
}

/// Build storage, adapters and services from configuration.
///
/// Postgres storage runs pending migrations before opening the pool.
///
/// # Errors
///
/// Returns [`StartupError`] for invalid settings or an unreachable database.
pub async fn build_state(config: &AppConfig) -> Result<BuiltState, StartupError> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let auth_mode = config.auth_mode()?;
    let auth = auth_strategy(config, clock.clone())?;
    let ai = Arc::new(HttpAiGateway::new(HttpAiGatewaySettings {
        base_url: config.ai_base_url()?,
        api_key: config.ai_api_key(),
        models: config.ai_models(),
        timeout: config.ai_timeout(),
    })?);

    let (ports, session_store) = match config.storage()? {
        StorageMode::Memory => {
            info!("using in-memory storage; data is lost on restart");
            let ports = service_ports(MemoryRepositories::memory(&clock), ai);
            (ports, SessionBackend::Memory(MemorySessionStore::new(clock)))
        }
        StorageMode::Postgres => {
            let url = config.database_url()?;
            run_migrations(url).await?;
            let pool = DbPool::new(PoolConfig::new(url)).await?;
            info!("using PostgreSQL storage");
            let ports = service_ports(DieselRepositories::postgres(&pool), ai);
            (ports, SessionBackend::Postgres(DieselSessionStore::new(pool)))
        }
    };

    let http_state =
        HttpState::new(ports, auth).with_max_upload_bytes(config.max_upload_bytes());
    Ok(BuiltState {
        http_state: web::Data::new(http_state),
        sessions: matches!(auth_mode, AuthMode::Session).then_some(session_store),
    })
}
