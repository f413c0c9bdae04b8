//! Shared helpers for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so
//! the app builders and the scripted AI gateway live here and are pulled in
//! with `mod support;`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use actix_web::cookie::time::Duration;
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header::CONTENT_TYPE;
use actix_web::test::{self, TestRequest};
use actix_web::web;
use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use serde_json::Value;

use study_assistant::domain::ports::{AiGateway, AiGatewayError, AiTask, CompletionRequest};
use study_assistant::inbound::http::auth::{AuthStrategy, SessionAuth, TokenAuth};
use study_assistant::inbound::http::health::HealthState;
use study_assistant::inbound::http::session_config::SessionSettings;
use study_assistant::inbound::http::state::HttpState;
use study_assistant::outbound::security::JwtTokenService;
use study_assistant::outbound::sessions::{MemorySessionStore, SessionBackend};
use study_assistant::server::state_builders::{MemoryRepositories, service_ports};
use study_assistant::server::{AppDependencies, SessionLayer};

pub const TOKEN_SECRET: &[u8] = b"integration-test-secret-of-forty-bytes!!";
pub const CHAT_REPLY: &str = "Mitochondria turn nutrients into ATP.";
const BOUNDARY: &str = "study-integration-boundary";

/// AI gateway double answering chat and vision turns with a fixed reply and
/// structured generation with queued replies.
///
/// An empty queue yields a reply that is not JSON, which generation must
/// reject.
pub struct StubAi {
    requests: Mutex<Vec<CompletionRequest>>,
    structured: Mutex<VecDeque<String>>,
}

impl StubAi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            structured: Mutex::new(VecDeque::new()),
        })
    }

    pub fn queue_structured(&self, reply: impl Into<String>) {
        self.structured
            .lock()
            .expect("structured replies lock")
            .push_back(reply.into());
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl AiGateway for StubAi {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AiGatewayError> {
        let task = request.task;
        self.requests.lock().expect("requests lock").push(request);
        let reply = match task {
            AiTask::Reasoning => self
                .structured
                .lock()
                .expect("structured replies lock")
                .pop_front()
                .unwrap_or_else(|| "Sorry, I cannot produce JSON today.".to_owned()),
            AiTask::Chat | AiTask::Vision => CHAT_REPLY.to_owned(),
        };
        Ok(reply)
    }
}

fn state(ai: Arc<StubAi>, auth: Arc<dyn AuthStrategy>) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let ports = service_ports(MemoryRepositories::memory(&clock), ai);
    web::Data::new(HttpState::new(ports, auth))
}

fn ready_health() -> web::Data<HealthState> {
    let health = web::Data::new(HealthState::new());
    health.mark_ready();
    health
}

/// Dependencies for an in-memory app using bearer tokens.
pub fn token_app(ai: Arc<StubAi>) -> AppDependencies {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let tokens = JwtTokenService::new(TOKEN_SECRET, clock).expect("token service");
    AppDependencies {
        health_state: ready_health(),
        http_state: state(ai, Arc::new(TokenAuth::new(Arc::new(tokens)))),
        sessions: None,
    }
}

/// Dependencies for an in-memory app using cookie sessions.
pub fn session_app(ai: Arc<StubAi>) -> AppDependencies {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    AppDependencies {
        health_state: ready_health(),
        http_state: state(ai, Arc::new(SessionAuth)),
        sessions: Some(SessionLayer {
            store: SessionBackend::Memory(MemorySessionStore::new(clock)),
            settings: SessionSettings {
                key: Key::generate(),
                cookie_secure: false,
                same_site: SameSite::Lax,
                ttl: Duration::hours(1),
            },
        }),
    }
}

pub fn register_request(username: &str) -> TestRequest {
    TestRequest::post()
        .uri("/api/register")
        .set_json(serde_json::json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "correct horse battery"
        }))
}

/// Multipart upload of a single `file` part.
pub fn upload_request(filename: &str, content_type: &str, body: &[u8]) -> TestRequest {
    let mut payload = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    payload.extend_from_slice(body);
    payload.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    TestRequest::post()
        .uri("/api/materials/upload")
        .insert_header((
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(payload)
}

/// Send a request and return the status code with the JSON body, or
/// `Value::Null` when the body is empty.
pub async fn send<S>(app: &S, req: TestRequest) -> (u16, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status().as_u16();
    let bytes = test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON response body")
    };
    (status, body)
}

pub fn error_code(body: &Value) -> Option<&str> {
    body.get("code").and_then(Value::as_str)
}
