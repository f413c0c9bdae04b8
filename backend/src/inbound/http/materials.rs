//! Study material API handlers.
//!
//! ```text
//! GET /api/materials
//! GET /api/materials/{id}
//! POST /api/materials/upload   (multipart/form-data, field `file`)
//! POST /api/materials/youtube {"url":"https://youtu.be/dQw4w9WgXcQ","title":"Lecture 1"}
//! DELETE /api/materials/{id}
//! ```

use actix_multipart::{Field, Multipart};
use actix_web::{HttpResponse, delete, get, post, web};
use futures_util::TryStreamExt as _;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::ports::{UploadedFile, YouTubeRequest};
use crate::domain::{Error, Material, MaterialId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, file_too_large_error, invalid_multipart_error, missing_field_error, parse_id,
};

const FILE: FieldName = FieldName::new("file");
const ID: FieldName = FieldName::new("id");

/// Body for `POST /api/materials/youtube`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeMaterialRequest {
    #[schema(example = "https://www.youtube.com/watch?v=dQw4w9WgXcQ")]
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Multipart form accepted by `POST /api/materials/upload`.
#[derive(ToSchema)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

async fn read_limited(field: &mut Field, limit: usize) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(invalid_multipart_error)? {
        if bytes.len() + chunk.len() > limit {
            return Err(file_too_large_error(FILE, limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Pull the `file` part out of the form, enforcing the upload ceiling while
/// streaming so oversized bodies are never buffered whole.
async fn read_upload(mut payload: Multipart, limit: usize) -> Result<UploadedFile, Error> {
    let mut upload = None;
    while let Some(mut field) = payload.try_next().await.map_err(invalid_multipart_error)? {
        if field.name() != Some(FILE.as_str()) || upload.is_some() {
            debug!(name = ?field.name(), "skipping multipart field");
            while field
                .try_next()
                .await
                .map_err(invalid_multipart_error)?
                .is_some()
            {}
            continue;
        }
        let filename = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .unwrap_or_default()
            .to_owned();
        let content_type = field.content_type().map(|mime| mime.essence_str().to_owned());
        let bytes = read_limited(&mut field, limit).await?;
        upload = Some(UploadedFile {
            filename,
            content_type,
            bytes,
        });
    }
    upload.ok_or_else(|| missing_field_error(FILE))
}

/// List the caller's materials, newest first.
#[utoipa::path(
    get,
    path = "/api/materials",
    responses(
        (status = 200, description = "Materials", body = [Material]),
        (status = 401, description = "Login required", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["materials"],
    operation_id = "listMaterials"
)]
#[get("/materials")]
pub async fn list_materials(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<Material>>> {
    Ok(web::Json(state.materials.list(user.id()).await?))
}

/// Fetch one of the caller's materials.
#[utoipa::path(
    get,
    path = "/api/materials/{id}",
    params(("id" = String, Path, description = "Material id")),
    responses(
        (status = 200, description = "Material", body = Material),
        (status = 400, description = "Invalid id", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Material not found", body = Error)
    ),
    tags = ["materials"],
    operation_id = "getMaterial"
)]
#[get("/materials/{id}")]
pub async fn get_material(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Material>> {
    let id: MaterialId = parse_id(&path, ID)?;
    Ok(web::Json(state.materials.get(user.id(), id).await?))
}

/// Upload a file and extract its study text.
///
/// Text files are stored verbatim, PDFs have their text extracted, images are
/// described by the vision model, and videos get a placeholder.
#[utoipa::path(
    post,
    path = "/api/materials/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Material created", body = Material),
        (status = 400, description = "Missing, empty, oversized or unsupported file", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 500, description = "AI service failure", body = Error)
    ),
    tags = ["materials"],
    operation_id = "uploadMaterial"
)]
#[post("/materials/upload")]
pub async fn upload_material(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let file = read_upload(payload, state.max_upload_bytes).await?;
    let material = state.materials.upload(user.id(), file).await?;
    Ok(HttpResponse::Created().json(material))
}

/// Register a YouTube video as study material.
#[utoipa::path(
    post,
    path = "/api/materials/youtube",
    request_body = YouTubeMaterialRequest,
    responses(
        (status = 201, description = "Material created", body = Material),
        (status = 400, description = "Invalid YouTube link", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["materials"],
    operation_id = "addYouTubeMaterial"
)]
#[post("/materials/youtube")]
pub async fn add_youtube_material(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    payload: web::Json<YouTubeMaterialRequest>,
) -> ApiResult<HttpResponse> {
    let YouTubeMaterialRequest { url, title } = payload.into_inner();
    let material = state
        .materials
        .add_youtube(user.id(), YouTubeRequest { url, title })
        .await?;
    Ok(HttpResponse::Created().json(material))
}

/// Delete one of the caller's materials.
#[utoipa::path(
    delete,
    path = "/api/materials/{id}",
    params(("id" = String, Path, description = "Material id")),
    responses(
        (status = 204, description = "Material deleted"),
        (status = 400, description = "Invalid id", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Material not found", body = Error)
    ),
    tags = ["materials"],
    operation_id = "deleteMaterial"
)]
#[delete("/materials/{id}")]
pub async fn delete_material(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: MaterialId = parse_id(&path, ID)?;
    state.materials.delete(user.id(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "materials_tests.rs"]
mod tests;
