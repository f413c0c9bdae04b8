//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{RepositoryError, UserRepository};
use crate::domain::{
    EmailAddress, Locale, NewUser, User, UserChanges, UserId, UserValidationError, Username,
};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::jsonb_columns::parse;
use super::models::{NewUserRow, UserRow, UserUpdate};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn corrupted(column: &'static str) -> impl Fn(UserValidationError) -> RepositoryError {
    move |err| RepositoryError::query(format!("corrupted {column} in database: {err}"))
}

/// Rebuild a domain user, revalidating every column.
fn row_to_user(row: UserRow) -> Result<User, RepositoryError> {
    let draft = NewUser {
        username: Username::new(&row.username).map_err(corrupted("username"))?,
        email: EmailAddress::new(&row.email).map_err(corrupted("email"))?,
        password_hash: row.password_hash,
        plan: parse(&row.plan, "plan")?,
        role: parse(&row.role, "role")?,
        locale: Locale::new(&row.locale).map_err(corrupted("locale"))?,
    };
    Ok(User::from_parts(
        UserId::from_uuid(row.id),
        draft,
        row.created_at,
    ))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewUserRow {
            id: Uuid::new_v4(),
            username: user.username.as_str(),
            email: user.email.as_str(),
            password_hash: &user.password_hash,
            plan: user.plan.as_str(),
            role: user.role.as_str(),
            locale: user.locale.as_str(),
        };

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_user(row)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn update(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<Option<User>, RepositoryError> {
        // Diesel rejects an empty changeset.
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let update = UserUpdate {
            email: changes.email.as_ref().map(EmailAddress::as_str),
            locale: changes.locale.as_ref().map(Locale::as_str),
        };

        let row: Option<UserRow> = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(&update)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .order((users::created_at.desc(), users::seq.desc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_user).collect()
    }
}
