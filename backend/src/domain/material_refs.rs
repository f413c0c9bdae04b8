//! Resolution of material ids referenced by messages and generation requests.

use serde_json::json;

use crate::domain::ports::{MaterialRepository, map_repository_error};
use crate::domain::{Error, Material, MaterialId, UserId, require_owned};

/// Load each referenced material, requiring the caller to own all of them.
///
/// Duplicate ids are collapsed and the first-seen order is kept.
pub(crate) async fn resolve_materials<M>(
    repo: &M,
    user_id: UserId,
    ids: &[MaterialId],
) -> Result<Vec<Material>, Error>
where
    M: MaterialRepository + ?Sized,
{
    let mut resolved: Vec<Material> = Vec::with_capacity(ids.len());
    for id in ids {
        if resolved.iter().any(|material| material.id == *id) {
            continue;
        }
        let found = repo.find_by_id(*id).await.map_err(map_repository_error)?;
        resolved.push(require_owned(found, user_id, "material")?);
    }
    Ok(resolved)
}

/// Like [`resolve_materials`] but rejects an empty id list.
pub(crate) async fn resolve_required_materials<M>(
    repo: &M,
    user_id: UserId,
    ids: &[MaterialId],
) -> Result<Vec<Material>, Error>
where
    M: MaterialRepository + ?Sized,
{
    if ids.is_empty() {
        return Err(
            Error::invalid_request("at least one material id is required")
                .with_details(json!({ "field": "materialIds", "code": "required" })),
        );
    }
    resolve_materials(repo, user_id, ids).await
}
