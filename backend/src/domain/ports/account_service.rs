//! Driving port for account use-cases.
//!
//! Inbound adapters call this port to register, authenticate and manage
//! users without importing hashing or persistence details.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Registration, User, UserChanges, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an account on the free plan with the `user` role.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` with details code `username_taken` or
    ///   `email_taken` when either is already registered.
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// Verify credentials.
    ///
    /// Unknown usernames and wrong passwords both yield
    /// `Unauthorized("invalid credentials")`.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;

    /// Load the authenticated user; a vanished account is `Unauthorized`.
    async fn current_user(&self, user_id: UserId) -> Result<User, Error>;

    async fn update_profile(&self, user_id: UserId, changes: UserChanges) -> Result<User, Error>;

    /// List every account. Requires `actor` to be an admin, else `Forbidden`.
    async fn list_users(&self, actor: UserId) -> Result<Vec<User>, Error>;
}
