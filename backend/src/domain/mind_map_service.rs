//! Mind-map domain service.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::generation::map_generation_error;
use crate::domain::material_refs::{resolve_materials, resolve_required_materials};
use crate::domain::ports::{
    AiGateway, AiTask, CompletionRequest, CreateMindMap, GenerateMindMap, MaterialRepository,
    MindMapPatch, MindMapRepository, MindMapService, map_gateway_error, map_repository_error,
};
use crate::domain::prompts::mind_map_messages;
use crate::domain::{
    Error, MindMap, MindMapChanges, MindMapGraph, MindMapId, MindMapValidationError, NewMindMap,
    UserId, mind_map_title, parse_mind_map_reply, require_owned,
};

fn graph_error(error: MindMapValidationError) -> Error {
    Error::invalid_request(error.to_string())
        .with_details(json!({ "field": "nodes", "code": "invalid_graph" }))
}

/// Mind-map service implementing the [`MindMapService`] driving port.
#[derive(Clone)]
pub struct MindMapServiceImpl<R, M, A> {
    mind_maps: Arc<R>,
    materials: Arc<M>,
    ai: Arc<A>,
}

impl<R, M, A> MindMapServiceImpl<R, M, A> {
    pub fn new(mind_maps: Arc<R>, materials: Arc<M>, ai: Arc<A>) -> Self {
        Self {
            mind_maps,
            materials,
            ai,
        }
    }
}

impl<R, M, A> MindMapServiceImpl<R, M, A>
where
    R: MindMapRepository,
    M: MaterialRepository,
    A: AiGateway,
{
    async fn owned(&self, user_id: UserId, id: MindMapId) -> Result<MindMap, Error> {
        let found = self
            .mind_maps
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?;
        require_owned(found, user_id, "mind map")
    }
}

#[async_trait]
impl<R, M, A> MindMapService for MindMapServiceImpl<R, M, A>
where
    R: MindMapRepository,
    M: MaterialRepository,
    A: AiGateway,
{
    async fn list(&self, user_id: UserId) -> Result<Vec<MindMap>, Error> {
        self.mind_maps
            .list_for_user(user_id)
            .await
            .map_err(map_repository_error)
    }

    async fn get(&self, user_id: UserId, id: MindMapId) -> Result<MindMap, Error> {
        self.owned(user_id, id).await
    }

    async fn create(&self, user_id: UserId, request: CreateMindMap) -> Result<MindMap, Error> {
        let CreateMindMap {
            title,
            graph,
            material_ids,
        } = request;
        let materials = resolve_materials(self.materials.as_ref(), user_id, &material_ids).await?;
        self.mind_maps
            .create(NewMindMap {
                user_id,
                title,
                graph,
                material_ids: materials.iter().map(|material| material.id).collect(),
            })
            .await
            .map_err(map_repository_error)
    }

    async fn generate(
        &self,
        user_id: UserId,
        request: GenerateMindMap,
    ) -> Result<MindMap, Error> {
        let materials =
            resolve_required_materials(self.materials.as_ref(), user_id, &request.material_ids)
                .await?;
        let reply = self
            .ai
            .complete(CompletionRequest {
                task: AiTask::Reasoning,
                messages: mind_map_messages(&materials, request.topic.as_deref()),
                json_output: true,
            })
            .await
            .map_err(map_gateway_error)?;
        let generated = parse_mind_map_reply(&reply).map_err(map_generation_error)?;

        let title = request
            .title
            .or_else(|| {
                generated
                    .title
                    .as_deref()
                    .and_then(|title| mind_map_title(title).ok())
            })
            .or_else(|| request.topic.as_deref().and_then(|topic| mind_map_title(topic).ok()))
            .unwrap_or_else(|| "Mind map".to_owned());

        self.mind_maps
            .create(NewMindMap {
                user_id,
                title,
                graph: generated.graph,
                material_ids: materials.iter().map(|material| material.id).collect(),
            })
            .await
            .map_err(map_repository_error)
    }

    async fn update(
        &self,
        user_id: UserId,
        id: MindMapId,
        patch: MindMapPatch,
    ) -> Result<MindMap, Error> {
        let current = self.owned(user_id, id).await?;
        let MindMapPatch {
            title,
            nodes,
            connections,
        } = patch;
        let graph = if nodes.is_some() || connections.is_some() {
            let nodes = nodes.unwrap_or(current.nodes);
            let connections = connections.unwrap_or(current.connections);
            Some(MindMapGraph::new(nodes, connections).map_err(graph_error)?)
        } else {
            None
        };

        self.mind_maps
            .update(id, MindMapChanges { title, graph })
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found("mind map not found"))
    }

    async fn delete(&self, user_id: UserId, id: MindMapId) -> Result<(), Error> {
        self.owned(user_id, id).await?;
        self.mind_maps
            .delete(id)
            .await
            .map_err(map_repository_error)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "mind_map_service_tests.rs"]
mod tests;
