//! Server-side session stores for `actix-session`.
//!
//! The session cookie only carries an opaque key; state lives in process
//! memory or in the `sessions` table, matching the configured storage
//! backend. [`SessionBackend`] lets the server pick one at startup while
//! `SessionMiddleware` stays a single concrete type.

mod memory;

use std::collections::HashMap;

use actix_session::storage::{LoadError, SaveError, SessionKey, SessionStore, UpdateError};
use actix_web::cookie::time::Duration;
use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::outbound::persistence::DieselSessionStore;

pub use memory::MemorySessionStore;

/// State map handled by `actix-session`; values are JSON-encoded strings.
pub type SessionState = HashMap<String, String>;

/// Fresh 64-character key with 244 random bits.
pub(crate) fn generate_session_key() -> Result<SessionKey, anyhow::Error> {
    let raw = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    SessionKey::try_from(raw).map_err(|_| anyhow::anyhow!("generated session key was rejected"))
}

/// Absolute expiry for a session refreshed at `now`.
pub(crate) fn expiry(now: DateTime<Utc>, ttl: &Duration) -> DateTime<Utc> {
    let ttl = TimeDelta::try_seconds(ttl.whole_seconds()).unwrap_or(TimeDelta::zero());
    now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Session store selected from configuration.
#[derive(Clone)]
pub enum SessionBackend {
    Memory(MemorySessionStore),
    Postgres(DieselSessionStore),
}

impl SessionStore for SessionBackend {
    async fn load(&self, session_key: &SessionKey) -> Result<Option<SessionState>, LoadError> {
        match self {
            Self::Memory(store) => store.load(session_key).await,
            Self::Postgres(store) => store.load(session_key).await,
        }
    }

    async fn save(
        &self,
        session_state: SessionState,
        ttl: &Duration,
    ) -> Result<SessionKey, SaveError> {
        match self {
            Self::Memory(store) => store.save(session_state, ttl).await,
            Self::Postgres(store) => store.save(session_state, ttl).await,
        }
    }

    async fn update(
        &self,
        session_key: SessionKey,
        session_state: SessionState,
        ttl: &Duration,
    ) -> Result<SessionKey, UpdateError> {
        match self {
            Self::Memory(store) => store.update(session_key, session_state, ttl).await,
            Self::Postgres(store) => store.update(session_key, session_state, ttl).await,
        }
    }

    async fn update_ttl(&self, session_key: &SessionKey, ttl: &Duration) -> Result<(), anyhow::Error> {
        match self {
            Self::Memory(store) => store.update_ttl(session_key, ttl).await,
            Self::Postgres(store) => store.update_ttl(session_key, ttl).await,
        }
    }

    async fn delete(&self, session_key: &SessionKey) -> Result<(), anyhow::Error> {
        match self {
            Self::Memory(store) => store.delete(session_key).await,
            Self::Postgres(store) => store.delete(session_key).await,
        }
    }
}
