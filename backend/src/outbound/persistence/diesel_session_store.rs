//! PostgreSQL-backed `actix-session` store using the `sessions` table.
//!
//! Expired rows are ignored on load and deleted whenever a new session is
//! saved.

use actix_session::storage::{LoadError, SaveError, SessionKey, SessionStore, UpdateError};
use actix_web::cookie::time::Duration;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::outbound::sessions::{SessionState, expiry, generate_session_key};

use super::models::NewSessionRow;
use super::pool::DbPool;
use super::schema::sessions;

/// Durable session store for the `postgres` storage backend.
#[derive(Clone)]
pub struct DieselSessionStore {
    pool: DbPool,
}

impl DieselSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn other(error: impl std::fmt::Display) -> anyhow::Error {
    anyhow::anyhow!("session store failure: {error}")
}

impl SessionStore for DieselSessionStore {
    async fn load(&self, session_key: &SessionKey) -> Result<Option<SessionState>, LoadError> {
        let mut conn = self.pool.get().await.map_err(|err| LoadError::Other(other(err)))?;
        let state: Option<serde_json::Value> = sessions::table
            .filter(sessions::session_key.eq(session_key.as_ref()))
            .filter(sessions::expires_at.gt(Utc::now()))
            .select(sessions::state)
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| LoadError::Other(other(err)))?;
        state
            .map(serde_json::from_value)
            .transpose()
            .map_err(|err| LoadError::Deserialization(other(err)))
    }

    async fn save(
        &self,
        session_state: SessionState,
        ttl: &Duration,
    ) -> Result<SessionKey, SaveError> {
        let state = serde_json::to_value(&session_state)
            .map_err(|err| SaveError::Serialization(other(err)))?;
        let key = generate_session_key().map_err(SaveError::Other)?;
        let now = Utc::now();
        let mut conn = self.pool.get().await.map_err(|err| SaveError::Other(other(err)))?;
        diesel::delete(sessions::table.filter(sessions::expires_at.le(now)))
            .execute(&mut conn)
            .await
            .map_err(|err| SaveError::Other(other(err)))?;
        diesel::insert_into(sessions::table)
            .values(&NewSessionRow {
                session_key: key.as_ref(),
                state,
                expires_at: expiry(now, ttl),
            })
            .execute(&mut conn)
            .await
            .map_err(|err| SaveError::Other(other(err)))?;
        Ok(key)
    }

    async fn update(
        &self,
        session_key: SessionKey,
        session_state: SessionState,
        ttl: &Duration,
    ) -> Result<SessionKey, UpdateError> {
        let state = serde_json::to_value(&session_state)
            .map_err(|err| UpdateError::Serialization(other(err)))?;
        let mut conn = self.pool.get().await.map_err(|err| UpdateError::Other(other(err)))?;
        let target = sessions::table.filter(sessions::session_key.eq(session_key.as_ref()));
        let updated = diesel::update(target)
            .set((
                sessions::state.eq(state),
                sessions::expires_at.eq(expiry(Utc::now(), ttl)),
            ))
            .execute(&mut conn)
            .await
            .map_err(|err| UpdateError::Other(other(err)))?;
        drop(conn);
        if updated > 0 {
            return Ok(session_key);
        }
        self.save(session_state, ttl).await.map_err(|err| match err {
            SaveError::Serialization(err) => UpdateError::Serialization(err),
            SaveError::Other(err) => UpdateError::Other(err),
        })
    }

    async fn update_ttl(&self, session_key: &SessionKey, ttl: &Duration) -> Result<(), anyhow::Error> {
        let mut conn = self.pool.get().await.map_err(other)?;
        diesel::update(sessions::table.filter(sessions::session_key.eq(session_key.as_ref())))
            .set(sessions::expires_at.eq(expiry(Utc::now(), ttl)))
            .execute(&mut conn)
            .await
            .map_err(other)?;
        Ok(())
    }

    async fn delete(&self, session_key: &SessionKey) -> Result<(), anyhow::Error> {
        let mut conn = self.pool.get().await.map_err(other)?;
        diesel::delete(sessions::table.filter(sessions::session_key.eq(session_key.as_ref())))
            .execute(&mut conn)
            .await
            .map_err(other)?;
        Ok(())
    }
}
