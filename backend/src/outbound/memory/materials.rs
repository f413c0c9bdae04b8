//! In-memory `MaterialRepository`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{MaterialRepository, RepositoryError};
use crate::domain::{Material, MaterialId, NewMaterial, UserId};

use super::{Table, lock, newest_first};

pub struct MemoryMaterialRepository {
    materials: Mutex<Table<MaterialId, Material>>,
    clock: Arc<dyn Clock>,
}

impl MemoryMaterialRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            materials: Mutex::new(Table::default()),
            clock,
        }
    }
}

#[async_trait]
impl MaterialRepository for MemoryMaterialRepository {
    async fn create(&self, material: NewMaterial) -> Result<Material, RepositoryError> {
        let stored = Material::from_draft(MaterialId::random(), material, self.clock.utc());
        lock(&self.materials)?.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: MaterialId) -> Result<Option<Material>, RepositoryError> {
        Ok(lock(&self.materials)?.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Material>, RepositoryError> {
        let materials = lock(&self.materials)?;
        Ok(newest_first(
            materials
                .values()
                .filter(|material| material.user_id == user_id)
                .cloned(),
            |material| material.created_at,
        ))
    }

    async fn delete(&self, id: MaterialId) -> Result<bool, RepositoryError> {
        Ok(lock(&self.materials)?.remove(&id).is_some())
    }
}
