//! Port abstraction for mind-map persistence.

use async_trait::async_trait;

use crate::domain::{MindMap, MindMapChanges, MindMapId, NewMindMap, UserId};

use super::RepositoryError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MindMapRepository: Send + Sync {
    async fn create(&self, mind_map: NewMindMap) -> Result<MindMap, RepositoryError>;

    async fn find_by_id(&self, id: MindMapId) -> Result<Option<MindMap>, RepositoryError>;

    /// Mind maps owned by `user_id`, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<MindMap>, RepositoryError>;

    /// Apply a partial change and refresh `updated_at`.
    ///
    /// Returns `None` when the mind map does not exist. Concurrent updates
    /// are last-writer-wins.
    async fn update(
        &self,
        id: MindMapId,
        changes: MindMapChanges,
    ) -> Result<Option<MindMap>, RepositoryError>;

    async fn delete(&self, id: MindMapId) -> Result<bool, RepositoryError>;
}
