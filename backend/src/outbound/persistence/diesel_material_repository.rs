//! PostgreSQL-backed `MaterialRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{MaterialRepository, RepositoryError};
use crate::domain::{Material, MaterialId, NewMaterial, UserId};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::jsonb_columns::parse;
use super::models::{MaterialRow, NewMaterialRow};
use super::pool::DbPool;
use super::schema::materials;

/// Diesel-backed implementation of the [`MaterialRepository`] port.
#[derive(Clone)]
pub struct DieselMaterialRepository {
    pool: DbPool,
}

impl DieselMaterialRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_material(row: MaterialRow) -> Result<Material, RepositoryError> {
    Ok(Material {
        id: MaterialId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        filename: row.filename,
        material_type: parse(&row.material_type, "material_type")?,
        content: row.content,
        source_url: row.source_url,
        created_at: row.created_at,
    })
}

#[async_trait]
impl MaterialRepository for DieselMaterialRepository {
    async fn create(&self, material: NewMaterial) -> Result<Material, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewMaterialRow {
            id: Uuid::new_v4(),
            user_id: *material.user_id.as_uuid(),
            filename: &material.filename,
            material_type: material.material_type.as_str(),
            content: &material.content,
            source_url: material.source_url.as_deref(),
        };

        let row: MaterialRow = diesel::insert_into(materials::table)
            .values(&new_row)
            .returning(MaterialRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_material(row)
    }

    async fn find_by_id(&self, id: MaterialId) -> Result<Option<Material>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<MaterialRow> = materials::table
            .filter(materials::id.eq(id.as_uuid()))
            .select(MaterialRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_material).transpose()
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Material>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<MaterialRow> = materials::table
            .filter(materials::user_id.eq(user_id.as_uuid()))
            .order((materials::created_at.desc(), materials::seq.desc()))
            .select(MaterialRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_material).collect()
    }

    async fn delete(&self, id: MaterialId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(materials::table.filter(materials::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
