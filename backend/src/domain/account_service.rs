//! Account domain service.
//!
//! Implements [`AccountService`] over a user repository and a credential
//! hasher. Unknown usernames still pay for one hash verification so response
//! timing does not reveal which usernames exist.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::domain::ports::{
    AccountService, CredentialHashError, CredentialHasher, UserRepository, map_repository_error,
};
use crate::domain::{
    Error, LoginCredentials, NewUser, Plan, Registration, User, UserChanges, UserId, UserRole,
};

/// Well-formed Argon2id hash that matches no password, verified against when
/// the username is unknown.
const DUMMY_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

fn map_hash_error(error: CredentialHashError) -> Error {
    Error::internal(format!("credential hashing failed: {error}"))
}

fn taken(field: &str, code: &str, message: &str) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field, "code": code }))
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

/// Account service implementing the [`AccountService`] driving port.
#[derive(Clone)]
pub struct AccountServiceImpl<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
}

impl<U, H> AccountServiceImpl<U, H> {
    pub fn new(users: Arc<U>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

impl<U, H> AccountServiceImpl<U, H>
where
    U: UserRepository,
    H: CredentialHasher,
{
    async fn ensure_email_free(&self, email: &str, owner: Option<UserId>) -> Result<(), Error> {
        let existing = self
            .users
            .find_by_email(email)
            .await
            .map_err(map_repository_error)?;
        match existing {
            Some(user) if Some(user.id()) != owner => Err(taken(
                "email",
                "email_taken",
                "email is already registered",
            )),
            _ => Ok(()),
        }
    }

    async fn require_user(&self, user_id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

#[async_trait]
impl<U, H> AccountService for AccountServiceImpl<U, H>
where
    U: UserRepository,
    H: CredentialHasher,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        let username_taken = self
            .users
            .find_by_username(registration.username().as_str())
            .await
            .map_err(map_repository_error)?
            .is_some();
        if username_taken {
            return Err(taken(
                "username",
                "username_taken",
                "username is already taken",
            ));
        }
        self.ensure_email_free(registration.email().as_str(), None)
            .await?;

        let password_hash = self
            .hasher
            .hash(registration.password())
            .await
            .map_err(map_hash_error)?;
        let user = self
            .users
            .create(NewUser {
                username: registration.username().clone(),
                email: registration.email().clone(),
                password_hash,
                plan: Plan::Free,
                role: UserRole::User,
                locale: registration.locale().clone(),
            })
            .await
            .map_err(map_repository_error)?;
        debug!(user_id = %user.id(), "registered user");
        Ok(user)
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let candidate = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(map_repository_error)?;

        let Some(user) = candidate else {
            // Equalise timing with the known-user path; the outcome is fixed.
            let _ = self
                .hasher
                .verify(credentials.password(), DUMMY_PASSWORD_HASH)
                .await;
            debug!("login rejected for unknown username");
            return Err(invalid_credentials());
        };

        let verified = self
            .hasher
            .verify(credentials.password(), user.password_hash())
            .await
            .map_err(map_hash_error)?;
        if verified {
            Ok(user)
        } else {
            debug!(user_id = %user.id(), "login rejected for wrong password");
            Err(invalid_credentials())
        }
    }

    async fn current_user(&self, user_id: UserId) -> Result<User, Error> {
        self.require_user(user_id).await
    }

    async fn update_profile(&self, user_id: UserId, changes: UserChanges) -> Result<User, Error> {
        if changes.is_empty() {
            return self.require_user(user_id).await;
        }
        if let Some(email) = &changes.email {
            self.ensure_email_free(email.as_str(), Some(user_id)).await?;
        }
        self.users
            .update(user_id, changes)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    async fn list_users(&self, actor: UserId) -> Result<Vec<User>, Error> {
        let actor = self.require_user(actor).await?;
        if !actor.is_admin() {
            return Err(Error::forbidden("admin role required"));
        }
        self.users.list().await.map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
