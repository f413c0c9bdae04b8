//! Port abstraction for account persistence.

use async_trait::async_trait;

use crate::domain::{NewUser, User, UserChanges, UserId};

use super::RepositoryError;

/// Storage for registered users.
///
/// Usernames and emails are unique; callers check availability with
/// [`UserRepository::find_by_username`] and [`UserRepository::find_by_email`]
/// before calling [`UserRepository::create`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new account, assigning its id and creation time.
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    /// Look up by email; `email` is expected in its normalised lowercase form.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// Apply a profile change. Returns `None` when the account is missing.
    async fn update(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<Option<User>, RepositoryError>;

    /// Every account, newest first.
    async fn list(&self) -> Result<Vec<User>, RepositoryError>;
}
