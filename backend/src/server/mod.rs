//! Server construction and middleware wiring.

pub mod config;
pub mod state_builders;

pub use config::{AppConfig, AuthMode, ConfigError, StorageMode};
pub use state_builders::{BuiltState, StartupError, build_state};

use std::net::SocketAddr;

use actix_session::SessionMiddleware;
use actix_session::config::PersistentSession;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::session::SESSION_COOKIE;
use crate::inbound::http::session_config::SessionSettings;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{configure_api, json_config};
use crate::middleware::Trace;
use crate::outbound::sessions::SessionBackend;

/// Server-side session store plus the cookie settings that front it.
#[derive(Clone)]
pub struct SessionLayer {
    pub store: SessionBackend,
    pub settings: SessionSettings,
}

impl SessionLayer {
    fn middleware(self) -> SessionMiddleware<SessionBackend> {
        let Self { store, settings } = self;
        SessionMiddleware::builder(store, settings.key)
            .cookie_name(SESSION_COOKIE.to_owned())
            .cookie_path("/".to_owned())
            .cookie_secure(settings.cookie_secure)
            .cookie_http_only(true)
            .cookie_same_site(settings.same_site)
            .session_lifecycle(PersistentSession::default().session_ttl(settings.ttl))
            .build()
    }
}

/// Per-worker inputs for [`build_app`].
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    /// `None` in token auth mode.
    pub sessions: Option<SessionLayer>,
}

/// Assemble the application: `/api` routes, health probes and, in debug
/// builds, Swagger UI at `/docs`.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        sessions,
    } = deps;

    let api = web::scope("/api")
        .app_data(json_config())
        .configure(configure_api);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(ready)
        .service(live);

    let app = match sessions {
        Some(layer) => app.service(api.wrap(layer.middleware())),
        None => app.service(api),
    };

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Listener settings and prebuilt state for [`create_server`].
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub http_state: web::Data<HttpState>,
    pub sessions: Option<SessionLayer>,
}

/// Bind the listener and mark the service ready.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        bind_addr,
        http_state,
        sessions,
    } = config;
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            sessions: sessions.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
