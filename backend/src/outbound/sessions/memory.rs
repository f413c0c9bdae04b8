//! Volatile session store used with in-memory storage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix_session::storage::{LoadError, SaveError, SessionKey, SessionStore, UpdateError};
use actix_web::cookie::time::Duration;
use chrono::{DateTime, Utc};
use mockable::Clock;

use super::{SessionState, expiry, generate_session_key};

struct Entry {
    state: SessionState,
    expires_at: DateTime<Utc>,
}

/// Sessions held in a shared map; clones share the same map.
#[derive(Clone)]
pub struct MemorySessionStore {
    sessions: Arc<Mutex<HashMap<String, Entry>>>,
    clock: Arc<dyn Clock>,
}

impl MemorySessionStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    fn with_sessions<T>(
        &self,
        f: impl FnOnce(&mut HashMap<String, Entry>) -> T,
    ) -> Result<T, anyhow::Error> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| anyhow::anyhow!("session map lock poisoned"))?;
        Ok(f(&mut sessions))
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.sessions.lock().map_or(0, |sessions| sessions.len())
    }
}

impl SessionStore for MemorySessionStore {
    async fn load(&self, session_key: &SessionKey) -> Result<Option<SessionState>, LoadError> {
        let now = self.clock.utc();
        self.with_sessions(|sessions| {
            let key = session_key.as_ref();
            match sessions.get(key) {
                Some(entry) if entry.expires_at > now => Some(entry.state.clone()),
                Some(_) => {
                    sessions.remove(key);
                    None
                }
                None => None,
            }
        })
        .map_err(LoadError::Other)
    }

    async fn save(
        &self,
        session_state: SessionState,
        ttl: &Duration,
    ) -> Result<SessionKey, SaveError> {
        let key = generate_session_key().map_err(SaveError::Other)?;
        let now = self.clock.utc();
        let expires_at = expiry(now, ttl);
        self.with_sessions(|sessions| {
            // Abandoned sessions are never loaded again, so drop them here.
            sessions.retain(|_, entry| entry.expires_at > now);
            sessions.insert(
                key.as_ref().to_owned(),
                Entry {
                    state: session_state,
                    expires_at,
                },
            );
        })
        .map_err(SaveError::Other)?;
        Ok(key)
    }

    async fn update(
        &self,
        session_key: SessionKey,
        session_state: SessionState,
        ttl: &Duration,
    ) -> Result<SessionKey, UpdateError> {
        let expires_at = expiry(self.clock.utc(), ttl);
        let replaced = self
            .with_sessions(|sessions| match sessions.get_mut(session_key.as_ref()) {
                Some(entry) => {
                    entry.state = session_state.clone();
                    entry.expires_at = expires_at;
                    true
                }
                None => false,
            })
            .map_err(UpdateError::Other)?;
        if replaced {
            return Ok(session_key);
        }
        self.save(session_state, ttl).await.map_err(|err| match err {
            SaveError::Serialization(err) => UpdateError::Serialization(err),
            SaveError::Other(err) => UpdateError::Other(err),
        })
    }

    async fn update_ttl(&self, session_key: &SessionKey, ttl: &Duration) -> Result<(), anyhow::Error> {
        let expires_at = expiry(self.clock.utc(), ttl);
        self.with_sessions(|sessions| {
            if let Some(entry) = sessions.get_mut(session_key.as_ref()) {
                entry.expires_at = expires_at;
            }
        })
    }

    async fn delete(&self, session_key: &SessionKey) -> Result<(), anyhow::Error> {
        self.with_sessions(|sessions| {
            sessions.remove(session_key.as_ref());
        })
    }
}
