//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_web::cookie::Key;
use actix_web::web;
use mockable::DefaultClock;

use super::auth::{AuthStrategy, MockAuthStrategy};
use super::session::SESSION_COOKIE;
use super::state::{HttpState, HttpStatePorts};
use crate::domain::ports::{
    MockAccountService, MockConversationService, MockMaterialService, MockMindMapService,
    MockQuizService,
};
use crate::domain::{Error, UserId};
use crate::outbound::sessions::MemorySessionStore;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing key per invocation.
/// - Keeps state in a private in-memory store.
/// - Disables the `Secure` flag for local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<MemorySessionStore> {
    SessionMiddleware::builder(
        MemorySessionStore::new(Arc::new(DefaultClock)),
        Key::generate(),
    )
    .cookie_name(SESSION_COOKIE.to_owned())
    .cookie_secure(false)
    .build()
}

/// Service mocks for handler tests; configure the ones a test touches.
#[derive(Default)]
pub struct MockPorts {
    pub accounts: MockAccountService,
    pub materials: MockMaterialService,
    pub conversations: MockConversationService,
    pub mind_maps: MockMindMapService,
    pub quizzes: MockQuizService,
}

impl MockPorts {
    pub fn into_http_state(self, auth: Arc<dyn AuthStrategy>) -> HttpState {
        let ports = HttpStatePorts {
            accounts: Arc::new(self.accounts),
            materials: Arc::new(self.materials),
            conversations: Arc::new(self.conversations),
            mind_maps: Arc::new(self.mind_maps),
            quizzes: Arc::new(self.quizzes),
        };
        HttpState::new(ports, auth)
    }

    pub fn into_state(self, auth: Arc<dyn AuthStrategy>) -> web::Data<HttpState> {
        web::Data::new(self.into_http_state(auth))
    }
}

/// Run `request` against an app serving `configure` under `/api` and return
/// the status with the decoded JSON body (`null` when empty).
pub async fn call_api<F>(
    state: web::Data<HttpState>,
    configure: F,
    request: actix_web::test::TestRequest,
) -> (actix_web::http::StatusCode, serde_json::Value)
where
    F: FnOnce(&mut web::ServiceConfig) + 'static,
{
    use actix_web::{App, test};

    let app = test::init_service(
        App::new()
            .app_data(state)
            .app_data(super::error::json_config())
            .service(web::scope("/api").configure(configure)),
    )
    .await;
    let response = test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = test::read_body(response).await;
    let value = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

/// Strategy that treats every request as coming from `user`.
pub fn signed_in(user: UserId) -> Arc<dyn AuthStrategy> {
    let mut auth = MockAuthStrategy::new();
    auth.expect_identify().returning(move |_| Ok(user));
    Arc::new(auth)
}

/// Strategy that rejects every request.
pub fn signed_out() -> Arc<dyn AuthStrategy> {
    let mut auth = MockAuthStrategy::new();
    auth.expect_identify()
        .returning(|_| Err(Error::unauthorized("login required")));
    Arc::new(auth)
}
