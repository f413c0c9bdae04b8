//! Driving port for study material use-cases.

use async_trait::async_trait;

use crate::domain::{Error, Material, MaterialId, UserId};

/// Raw upload handed over by an inbound adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Client-supplied name, possibly including a path.
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Request to register a YouTube video as a material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YouTubeRequest {
    pub url: String,
    pub title: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MaterialService: Send + Sync {
    async fn list(&self, user_id: UserId) -> Result<Vec<Material>, Error>;

    async fn get(&self, user_id: UserId, id: MaterialId) -> Result<Material, Error>;

    /// Classify the upload, extract its text and store it.
    ///
    /// Image uploads call the vision model; a gateway failure fails the
    /// upload with `UpstreamError`.
    async fn upload(&self, user_id: UserId, file: UploadedFile) -> Result<Material, Error>;

    async fn add_youtube(&self, user_id: UserId, request: YouTubeRequest)
    -> Result<Material, Error>;

    async fn delete(&self, user_id: UserId, id: MaterialId) -> Result<(), Error>;
}
