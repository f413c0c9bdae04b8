//! Request authentication strategies.
//!
//! Keep the HTTP modules focused on request/response mapping by concentrating
//! identity derivation here. The server picks one [`AuthStrategy`] at startup
//! (server-side session cookie or bearer token) and stores it in
//! [`HttpState`]; handlers only see the [`AuthenticatedUser`] extractor and
//! the `sign_in`/`sign_out` hooks.

use std::sync::Arc;

use actix_session::SessionExt;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use super::session::SessionContext;
use super::state::HttpState;
use crate::domain::ports::TokenService;
use crate::domain::{Error, UserId};

const LOGIN_REQUIRED: &str = "login required";
const BEARER_SCHEME: &str = "bearer";

/// How requests prove who they come from.
#[cfg_attr(test, mockall::automock)]
pub trait AuthStrategy: Send + Sync {
    /// Establish authentication for `user_id` after login or registration.
    ///
    /// Returns the token clients must present, when the strategy uses one.
    fn sign_in(&self, req: &HttpRequest, user_id: UserId) -> Result<Option<String>, Error>;

    /// Drop any server-side authentication state for the request.
    fn sign_out(&self, req: &HttpRequest);

    /// Resolve the caller or fail with `401 login required`.
    fn identify(&self, req: &HttpRequest) -> Result<UserId, Error>;
}

/// Server-side sessions keyed by the `session` cookie.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionAuth;

impl AuthStrategy for SessionAuth {
    fn sign_in(&self, req: &HttpRequest, user_id: UserId) -> Result<Option<String>, Error> {
        SessionContext::new(req.get_session()).persist_user(user_id)?;
        Ok(None)
    }

    fn sign_out(&self, req: &HttpRequest) {
        SessionContext::new(req.get_session()).purge();
    }

    fn identify(&self, req: &HttpRequest) -> Result<UserId, Error> {
        SessionContext::new(req.get_session()).require_user_id()
    }
}

/// Stateless signed bearer tokens.
#[derive(Clone)]
pub struct TokenAuth {
    tokens: Arc<dyn TokenService>,
}

impl TokenAuth {
    pub fn new(tokens: Arc<dyn TokenService>) -> Self {
        Self { tokens }
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case(BEARER_SCHEME) && !token.is_empty()).then_some(token)
}

impl AuthStrategy for TokenAuth {
    fn sign_in(&self, _req: &HttpRequest, user_id: UserId) -> Result<Option<String>, Error> {
        self.tokens
            .issue(user_id)
            .map(Some)
            .map_err(|error| Error::internal(format!("failed to issue token: {error}")))
    }

    fn sign_out(&self, _req: &HttpRequest) {}

    fn identify(&self, req: &HttpRequest) -> Result<UserId, Error> {
        let token = bearer_token(req).ok_or_else(|| Error::unauthorized(LOGIN_REQUIRED))?;
        self.tokens.verify(token).map_err(|error| {
            debug!(%error, "bearer token rejected");
            Error::unauthorized(LOGIN_REQUIRED)
        })
    }
}

/// Identity of the caller on protected routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

impl AuthenticatedUser {
    pub fn id(self) -> UserId {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = req
            .app_data::<web::Data<HttpState>>()
            .ok_or_else(|| Error::internal("HTTP state is not configured"))
            .and_then(|state| state.auth.identify(req))
            .map(Self);
        ready(result)
    }
}
