//! Port abstraction for study material persistence.

use async_trait::async_trait;

use crate::domain::{Material, MaterialId, NewMaterial, UserId};

use super::RepositoryError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MaterialRepository: Send + Sync {
    async fn create(&self, material: NewMaterial) -> Result<Material, RepositoryError>;

    async fn find_by_id(&self, id: MaterialId) -> Result<Option<Material>, RepositoryError>;

    /// Materials owned by `user_id`, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Material>, RepositoryError>;

    /// Remove a material. Returns whether a record was deleted.
    async fn delete(&self, id: MaterialId) -> Result<bool, RepositoryError>;
}
