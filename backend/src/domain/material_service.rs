//! Material domain service: classification, text extraction and storage.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;
use tracing::warn;

use crate::domain::ports::{
    AI_INVALID_RESPONSE, AiGateway, AiTask, CompletionRequest, InlineImage, MaterialRepository,
    MaterialService, PdfTextExtractor, UploadedFile, YouTubeRequest, map_gateway_error,
    map_repository_error,
};
use crate::domain::conversation::{has_nul, strip_nul};
use crate::domain::prompts::vision_messages;
use crate::domain::{
    Error, FILENAME_MAX, Material, MaterialId, MaterialType, NewMaterial, UserId, YouTubeLink,
    clean_filename, require_owned,
};

fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field, "code": code }))
}

fn image_mime(content_type: Option<&str>, filename: &str) -> String {
    if let Some(essence) = content_type
        .and_then(|value| value.split(';').next())
        .map(str::trim)
        .filter(|value| value.starts_with("image/"))
    {
        return essence.to_ascii_lowercase();
    }
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "image/png",
    }
    .to_owned()
}

/// Material service implementing the [`MaterialService`] driving port.
#[derive(Clone)]
pub struct MaterialServiceImpl<M, A, P> {
    materials: Arc<M>,
    ai: Arc<A>,
    pdf: Arc<P>,
}

impl<M, A, P> MaterialServiceImpl<M, A, P> {
    pub fn new(materials: Arc<M>, ai: Arc<A>, pdf: Arc<P>) -> Self {
        Self { materials, ai, pdf }
    }
}

impl<M, A, P> MaterialServiceImpl<M, A, P>
where
    M: MaterialRepository,
    A: AiGateway,
    P: PdfTextExtractor,
{
    async fn owned(&self, user_id: UserId, id: MaterialId) -> Result<Material, Error> {
        let found = self
            .materials
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?;
        require_owned(found, user_id, "material")
    }

    fn pdf_text(&self, filename: &str, bytes: &[u8]) -> String {
        match self.pdf.extract(bytes).map(|text| strip_nul(&text)) {
            Ok(text) if !text.trim().is_empty() => text.trim().to_owned(),
            Ok(_) => format!("[PDF document: {filename}]"),
            Err(error) => {
                warn!(%filename, error = %error, "pdf text extraction failed");
                format!("[PDF document: {filename}]")
            }
        }
    }

    async fn describe_image(
        &self,
        filename: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<String, Error> {
        let image = InlineImage {
            mime: image_mime(content_type, filename),
            data_base64: STANDARD.encode(bytes),
        };
        let reply = self
            .ai
            .complete(CompletionRequest {
                task: AiTask::Vision,
                messages: vision_messages(filename, image),
                json_output: false,
            })
            .await
            .map_err(map_gateway_error)?;
        let description = strip_nul(&reply);
        let description = description.trim();
        if description.is_empty() {
            warn!(%filename, "vision model returned an empty description");
            return Err(Error::upstream(AI_INVALID_RESPONSE));
        }
        Ok(description.to_owned())
    }
}

#[async_trait]
impl<M, A, P> MaterialService for MaterialServiceImpl<M, A, P>
where
    M: MaterialRepository,
    A: AiGateway,
    P: PdfTextExtractor,
{
    async fn list(&self, user_id: UserId) -> Result<Vec<Material>, Error> {
        self.materials
            .list_for_user(user_id)
            .await
            .map_err(map_repository_error)
    }

    async fn get(&self, user_id: UserId, id: MaterialId) -> Result<Material, Error> {
        self.owned(user_id, id).await
    }

    async fn upload(&self, user_id: UserId, file: UploadedFile) -> Result<Material, Error> {
        let UploadedFile {
            filename,
            content_type,
            bytes,
        } = file;
        let filename = clean_filename(&filename)
            .map_err(|err| field_error("file", "invalid_filename", err.to_string()))?;
        if bytes.is_empty() {
            return Err(field_error("file", "empty_file", "file is empty"));
        }
        let material_type = MaterialType::detect(content_type.as_deref(), &filename)
            .ok_or_else(|| field_error("file", "unsupported_type", "unsupported file type"))?;

        let content = match material_type {
            MaterialType::Text => {
                let text = String::from_utf8(bytes).map_err(|_| {
                    field_error("file", "invalid_encoding", "text files must be UTF-8 encoded")
                })?;
                if has_nul(&text) {
                    return Err(field_error(
                        "file",
                        "invalid_encoding",
                        "text files must not contain NUL characters",
                    ));
                }
                text
            }
            MaterialType::Pdf => self.pdf_text(&filename, &bytes),
            MaterialType::Image => {
                self.describe_image(&filename, content_type.as_deref(), &bytes)
                    .await?
            }
            MaterialType::Video => format!("[Video file: {filename}]"),
            MaterialType::Youtube => {
                return Err(field_error("file", "unsupported_type", "unsupported file type"));
            }
        };

        self.materials
            .create(NewMaterial {
                user_id,
                filename,
                material_type,
                content,
                source_url: None,
            })
            .await
            .map_err(map_repository_error)
    }

    async fn add_youtube(
        &self,
        user_id: UserId,
        request: YouTubeRequest,
    ) -> Result<Material, Error> {
        let link = YouTubeLink::parse(&request.url)
            .map_err(|err| field_error("url", "invalid_url", err.to_string()))?;
        let filename = match request
            .title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
        {
            Some(title) if has_nul(title) => {
                return Err(field_error(
                    "title",
                    "invalid_content",
                    "title must not contain NUL characters",
                ));
            }
            Some(title) if title.chars().count() > FILENAME_MAX => {
                return Err(field_error(
                    "title",
                    "too_long",
                    format!("title must be at most {FILENAME_MAX} characters"),
                ));
            }
            Some(title) => title.to_owned(),
            None => format!("YouTube video {}", link.video_id()),
        };
        let content = format!("[YouTube video: {}]\n{}", link.video_id(), link.url());

        self.materials
            .create(NewMaterial {
                user_id,
                filename,
                material_type: MaterialType::Youtube,
                content,
                source_url: Some(link.url().to_owned()),
            })
            .await
            .map_err(map_repository_error)
    }

    async fn delete(&self, user_id: UserId, id: MaterialId) -> Result<(), Error> {
        self.owned(user_id, id).await?;
        self.materials
            .delete(id)
            .await
            .map_err(map_repository_error)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "material_service_tests.rs"]
mod tests;
