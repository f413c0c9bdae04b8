//! In-memory `UserRepository`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{RepositoryError, UserRepository};
use crate::domain::{NewUser, User, UserChanges, UserId};

use super::{Table, lock, newest_first};

/// Volatile account store. Enforces username and email uniqueness like the
/// relational schema does.
pub struct MemoryUserRepository {
    users: Mutex<Table<UserId, User>>,
    clock: Arc<dyn Clock>,
}

impl MemoryUserRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            users: Mutex::new(Table::default()),
            clock,
        }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut users = lock(&self.users)?;
        if users
            .values()
            .any(|existing| existing.username() == &user.username || existing.email() == &user.email)
        {
            return Err(RepositoryError::query("duplicate username or email"));
        }
        let stored = User::from_parts(UserId::random(), user, self.clock.utc());
        users.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.users)?.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let users = lock(&self.users)?;
        Ok(users
            .values()
            .find(|user| user.username().as_str() == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let users = lock(&self.users)?;
        Ok(users
            .values()
            .find(|user| user.email().as_str() == email)
            .cloned())
    }

    async fn update(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<Option<User>, RepositoryError> {
        let mut users = lock(&self.users)?;
        let email_taken = changes.email.as_ref().is_some_and(|email| {
            users
                .values()
                .any(|user| user.id() != id && user.email() == email)
        });
        if email_taken {
            return Err(RepositoryError::query("duplicate email"));
        }
        Ok(users.get_mut(&id).map(|user| {
            user.apply(changes);
            user.clone()
        }))
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let users = lock(&self.users)?;
        Ok(newest_first(users.values().cloned(), User::created_at))
    }
}
