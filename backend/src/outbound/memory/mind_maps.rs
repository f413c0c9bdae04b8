//! In-memory `MindMapRepository`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{MindMapRepository, RepositoryError};
use crate::domain::{MindMap, MindMapChanges, MindMapId, NewMindMap, UserId};

use super::{Table, lock, newest_first};

pub struct MemoryMindMapRepository {
    mind_maps: Mutex<Table<MindMapId, MindMap>>,
    clock: Arc<dyn Clock>,
}

impl MemoryMindMapRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            mind_maps: Mutex::new(Table::default()),
            clock,
        }
    }
}

#[async_trait]
impl MindMapRepository for MemoryMindMapRepository {
    async fn create(&self, mind_map: NewMindMap) -> Result<MindMap, RepositoryError> {
        let stored = MindMap::from_draft(MindMapId::random(), mind_map, self.clock.utc());
        lock(&self.mind_maps)?.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: MindMapId) -> Result<Option<MindMap>, RepositoryError> {
        Ok(lock(&self.mind_maps)?.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<MindMap>, RepositoryError> {
        let mind_maps = lock(&self.mind_maps)?;
        Ok(newest_first(
            mind_maps
                .values()
                .filter(|map| map.user_id == user_id)
                .cloned(),
            |map| map.created_at,
        ))
    }

    async fn update(
        &self,
        id: MindMapId,
        changes: MindMapChanges,
    ) -> Result<Option<MindMap>, RepositoryError> {
        let now = self.clock.utc();
        let mut mind_maps = lock(&self.mind_maps)?;
        Ok(mind_maps.get_mut(&id).map(|map| {
            map.apply(changes, now);
            map.clone()
        }))
    }

    async fn delete(&self, id: MindMapId) -> Result<bool, RepositoryError> {
        Ok(lock(&self.mind_maps)?.remove(&id).is_some())
    }
}
