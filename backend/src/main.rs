//! Backend entry-point: loads configuration, builds storage and adapters,
//! and serves the REST API, health probes and OpenAPI docs.

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use study_assistant::inbound::http::health::HealthState;
use study_assistant::inbound::http::session_config::{BuildMode, session_settings_from_env};
use study_assistant::server::{
    AppConfig, ServerConfig, SessionLayer, build_state, create_server,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let bind_addr = config.bind_addr().map_err(std::io::Error::other)?;
    let built = build_state(&config).await.map_err(std::io::Error::other)?;

    let sessions = match built.sessions {
        Some(store) => {
            let settings =
                session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
                    .map_err(std::io::Error::other)?;
            Some(SessionLayer { store, settings })
        }
        None => None,
    };
    info!(
        %bind_addr,
        auth = if sessions.is_some() { "session" } else { "token" },
        "starting server"
    );

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state,
        ServerConfig {
            bind_addr,
            http_state: built.http_state,
            sessions,
        },
    )?;
    server.await
}
