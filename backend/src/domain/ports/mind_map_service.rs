//! Driving port for mind maps.

use async_trait::async_trait;

use crate::domain::{
    Error, MaterialId, MindMap, MindMapConnection, MindMapGraph, MindMapId, MindMapNode, UserId,
};

/// A user-authored mind map.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateMindMap {
    pub title: String,
    pub graph: MindMapGraph,
    pub material_ids: Vec<MaterialId>,
}

/// Request to generate a mind map from materials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateMindMap {
    pub material_ids: Vec<MaterialId>,
    pub topic: Option<String>,
    pub title: Option<String>,
}

/// Partial edit of a stored mind map.
///
/// When only one of `nodes` or `connections` is supplied the other keeps its
/// stored value and the merged graph is validated as a whole.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MindMapPatch {
    /// Already validated with [`crate::domain::mind_map_title`].
    pub title: Option<String>,
    pub nodes: Option<Vec<MindMapNode>>,
    pub connections: Option<Vec<MindMapConnection>>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MindMapService: Send + Sync {
    async fn list(&self, user_id: UserId) -> Result<Vec<MindMap>, Error>;

    async fn get(&self, user_id: UserId, id: MindMapId) -> Result<MindMap, Error>;

    async fn create(&self, user_id: UserId, request: CreateMindMap) -> Result<MindMap, Error>;

    /// Ask the reasoning model for a graph over the named materials.
    ///
    /// Output that fails validation is an `UpstreamError` and nothing is
    /// stored.
    async fn generate(&self, user_id: UserId, request: GenerateMindMap)
    -> Result<MindMap, Error>;

    async fn update(
        &self,
        user_id: UserId,
        id: MindMapId,
        patch: MindMapPatch,
    ) -> Result<MindMap, Error>;

    async fn delete(&self, user_id: UserId, id: MindMapId) -> Result<(), Error>;
}
