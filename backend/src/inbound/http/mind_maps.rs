//! Mind-map API handlers.
//!
//! ```text
//! GET /api/mindmaps
//! POST /api/mindmaps {"title":"Cells","nodes":[...],"connections":[...]}
//! POST /api/mindmaps/generate {"materialIds":["..."],"topic":"mitosis"}
//! GET /api/mindmaps/{id}
//! PUT /api/mindmaps/{id} {"nodes":[...]}
//! DELETE /api/mindmaps/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{CreateMindMap, GenerateMindMap, MindMapPatch};
use crate::domain::{
    Error, MindMap, MindMapConnection, MindMapGraph, MindMapId, MindMapNode, mind_map_title,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, parse_id, parse_material_ids};

const ID: FieldName = FieldName::new("id");
const TITLE: FieldName = FieldName::new("title");
const NODES: FieldName = FieldName::new("nodes");
const MATERIAL_IDS: FieldName = FieldName::new("materialIds");

/// Body for `POST /api/mindmaps`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMindMapRequest {
    #[schema(example = "Cell biology")]
    pub title: String,
    pub nodes: Vec<MindMapNode>,
    #[serde(default)]
    pub connections: Vec<MindMapConnection>,
    #[serde(default)]
    pub material_ids: Vec<String>,
}

impl TryFrom<CreateMindMapRequest> for CreateMindMap {
    type Error = Error;

    fn try_from(value: CreateMindMapRequest) -> Result<Self, Self::Error> {
        let title = mind_map_title(&value.title)
            .map_err(|err| field_error(TITLE, "invalid_title", err))?;
        let graph = MindMapGraph::new(value.nodes, value.connections)
            .map_err(|err| field_error(NODES, "invalid_graph", err))?;
        Ok(Self {
            title,
            graph,
            material_ids: parse_material_ids(value.material_ids, MATERIAL_IDS)?,
        })
    }
}

/// Body for `POST /api/mindmaps/generate`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMindMapRequest {
    pub material_ids: Vec<String>,
    /// Optional focus for the generated map.
    #[serde(default)]
    #[schema(example = "mitosis")]
    pub topic: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl TryFrom<GenerateMindMapRequest> for GenerateMindMap {
    type Error = Error;

    fn try_from(value: GenerateMindMapRequest) -> Result<Self, Self::Error> {
        let title = value
            .title
            .as_deref()
            .map(mind_map_title)
            .transpose()
            .map_err(|err| field_error(TITLE, "invalid_title", err))?;
        let topic = value
            .topic
            .map(|topic| topic.trim().to_owned())
            .filter(|topic| !topic.is_empty());
        Ok(Self {
            material_ids: parse_material_ids(value.material_ids, MATERIAL_IDS)?,
            topic,
            title,
        })
    }
}

/// Body for `PUT /api/mindmaps/{id}`; absent fields keep their stored values.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMindMapRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub nodes: Option<Vec<MindMapNode>>,
    #[serde(default)]
    pub connections: Option<Vec<MindMapConnection>>,
}

impl TryFrom<UpdateMindMapRequest> for MindMapPatch {
    type Error = Error;

    fn try_from(value: UpdateMindMapRequest) -> Result<Self, Self::Error> {
        let title = value
            .title
            .as_deref()
            .map(mind_map_title)
            .transpose()
            .map_err(|err| field_error(TITLE, "invalid_title", err))?;
        Ok(Self {
            title,
            nodes: value.nodes,
            connections: value.connections,
        })
    }
}

/// List the caller's mind maps, newest first.
#[utoipa::path(
    get,
    path = "/api/mindmaps",
    responses(
        (status = 200, description = "Mind maps", body = [MindMap]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["mindmaps"],
    operation_id = "listMindMaps"
)]
#[get("/mindmaps")]
pub async fn list_mind_maps(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<MindMap>>> {
    Ok(web::Json(state.mind_maps.list(user.id()).await?))
}

/// Store a mind map drawn by the user.
#[utoipa::path(
    post,
    path = "/api/mindmaps",
    request_body = CreateMindMapRequest,
    responses(
        (status = 201, description = "Mind map created", body = MindMap),
        (status = 400, description = "Invalid title or graph", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Material not found", body = Error)
    ),
    tags = ["mindmaps"],
    operation_id = "createMindMap"
)]
#[post("/mindmaps")]
pub async fn create_mind_map(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    payload: web::Json<CreateMindMapRequest>,
) -> ApiResult<HttpResponse> {
    let request = CreateMindMap::try_from(payload.into_inner())?;
    let mind_map = state.mind_maps.create(user.id(), request).await?;
    Ok(HttpResponse::Created().json(mind_map))
}

/// Generate a mind map from materials with the reasoning model.
#[utoipa::path(
    post,
    path = "/api/mindmaps/generate",
    request_body = GenerateMindMapRequest,
    responses(
        (status = 201, description = "Mind map generated", body = MindMap),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Material not found", body = Error),
        (status = 500, description = "AI service failure or invalid AI output", body = Error)
    ),
    tags = ["mindmaps"],
    operation_id = "generateMindMap"
)]
#[post("/mindmaps/generate")]
pub async fn generate_mind_map(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    payload: web::Json<GenerateMindMapRequest>,
) -> ApiResult<HttpResponse> {
    let request = GenerateMindMap::try_from(payload.into_inner())?;
    let mind_map = state.mind_maps.generate(user.id(), request).await?;
    Ok(HttpResponse::Created().json(mind_map))
}

/// Fetch one of the caller's mind maps.
#[utoipa::path(
    get,
    path = "/api/mindmaps/{id}",
    params(("id" = String, Path, description = "Mind map id")),
    responses(
        (status = 200, description = "Mind map", body = MindMap),
        (status = 400, description = "Invalid id", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Mind map not found", body = Error)
    ),
    tags = ["mindmaps"],
    operation_id = "getMindMap"
)]
#[get("/mindmaps/{id}")]
pub async fn get_mind_map(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<MindMap>> {
    let id: MindMapId = parse_id(&path, ID)?;
    Ok(web::Json(state.mind_maps.get(user.id(), id).await?))
}

/// Replace the title, nodes or connections of a mind map.
///
/// Nodes and connections are validated together after merging with the
/// stored graph.
#[utoipa::path(
    put,
    path = "/api/mindmaps/{id}",
    params(("id" = String, Path, description = "Mind map id")),
    request_body = UpdateMindMapRequest,
    responses(
        (status = 200, description = "Updated mind map", body = MindMap),
        (status = 400, description = "Invalid title or graph", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Mind map not found", body = Error)
    ),
    tags = ["mindmaps"],
    operation_id = "updateMindMap"
)]
#[put("/mindmaps/{id}")]
pub async fn update_mind_map(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateMindMapRequest>,
) -> ApiResult<web::Json<MindMap>> {
    let id: MindMapId = parse_id(&path, ID)?;
    let patch = MindMapPatch::try_from(payload.into_inner())?;
    Ok(web::Json(state.mind_maps.update(user.id(), id, patch).await?))
}

/// Delete one of the caller's mind maps.
#[utoipa::path(
    delete,
    path = "/api/mindmaps/{id}",
    params(("id" = String, Path, description = "Mind map id")),
    responses(
        (status = 204, description = "Mind map deleted"),
        (status = 400, description = "Invalid id", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Mind map not found", body = Error)
    ),
    tags = ["mindmaps"],
    operation_id = "deleteMindMap"
)]
#[delete("/mindmaps/{id}")]
pub async fn delete_mind_map(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: MindMapId = parse_id(&path, ID)?;
    state.mind_maps.delete(user.id(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "mind_maps_tests.rs"]
mod tests;
