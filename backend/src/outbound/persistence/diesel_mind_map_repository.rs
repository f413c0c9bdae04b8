//! PostgreSQL-backed `MindMapRepository` implementation using Diesel ORM.
//!
//! Nodes, connections and material ids live in JSONB columns. Graphs were
//! validated before they were written, so reads only check the JSON shape.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{MindMapRepository, RepositoryError};
use crate::domain::{MindMap, MindMapChanges, MindMapId, NewMindMap, UserId};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::jsonb_columns::{decode, encode};
use super::models::{MindMapRow, MindMapUpdate, NewMindMapRow};
use super::pool::DbPool;
use super::schema::mind_maps;

/// Diesel-backed implementation of the [`MindMapRepository`] port.
#[derive(Clone)]
pub struct DieselMindMapRepository {
    pool: DbPool,
}

impl DieselMindMapRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_mind_map(row: MindMapRow) -> Result<MindMap, RepositoryError> {
    Ok(MindMap {
        id: MindMapId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        title: row.title,
        nodes: decode(row.nodes, "nodes")?,
        connections: decode(row.connections, "connections")?,
        material_ids: decode(row.material_ids, "material_ids")?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl MindMapRepository for DieselMindMapRepository {
    async fn create(&self, mind_map: NewMindMap) -> Result<MindMap, RepositoryError> {
        let new_row = NewMindMapRow {
            id: Uuid::new_v4(),
            user_id: *mind_map.user_id.as_uuid(),
            title: &mind_map.title,
            nodes: encode(mind_map.graph.nodes(), "nodes")?,
            connections: encode(mind_map.graph.connections(), "connections")?,
            material_ids: encode(&mind_map.material_ids, "material_ids")?,
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: MindMapRow = diesel::insert_into(mind_maps::table)
            .values(&new_row)
            .returning(MindMapRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_mind_map(row)
    }

    async fn find_by_id(&self, id: MindMapId) -> Result<Option<MindMap>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<MindMapRow> = mind_maps::table
            .filter(mind_maps::id.eq(id.as_uuid()))
            .select(MindMapRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_mind_map).transpose()
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<MindMap>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<MindMapRow> = mind_maps::table
            .filter(mind_maps::user_id.eq(user_id.as_uuid()))
            .order((mind_maps::created_at.desc(), mind_maps::seq.desc()))
            .select(MindMapRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_mind_map).collect()
    }

    async fn update(
        &self,
        id: MindMapId,
        changes: MindMapChanges,
    ) -> Result<Option<MindMap>, RepositoryError> {
        let (nodes, connections) = match &changes.graph {
            Some(graph) => (
                Some(encode(graph.nodes(), "nodes")?),
                Some(encode(graph.connections(), "connections")?),
            ),
            None => (None, None),
        };
        let update = MindMapUpdate {
            title: changes.title.as_deref(),
            nodes,
            connections,
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<MindMapRow> =
            diesel::update(mind_maps::table.filter(mind_maps::id.eq(id.as_uuid())))
                .set((&update, mind_maps::updated_at.eq(Utc::now())))
                .returning(MindMapRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;
        row.map(row_to_mind_map).transpose()
    }

    async fn delete(&self, id: MindMapId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(mind_maps::table.filter(mind_maps::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
