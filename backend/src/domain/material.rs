//! Study materials: uploaded files and linked videos reduced to text.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use super::{MaterialId, Owned, UserId};

/// Maximum stored filename length.
pub const FILENAME_MAX: usize = 255;

/// Kind of source a material was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MaterialType {
    Pdf,
    Image,
    Video,
    Youtube,
    Text,
}

impl MaterialType {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
            Self::Video => "video",
            Self::Youtube => "youtube",
            Self::Text => "text",
        }
    }

    /// Classify an upload by content type, falling back to the extension.
    ///
    /// Generic content types such as `application/octet-stream` defer to the
    /// filename. YouTube links never arrive as uploads.
    ///
    /// # Examples
    /// ```
    /// use study_assistant::domain::MaterialType;
    ///
    /// assert_eq!(MaterialType::detect(Some("application/pdf"), "a.bin"), Some(MaterialType::Pdf));
    /// assert_eq!(MaterialType::detect(None, "notes.txt"), Some(MaterialType::Text));
    /// assert_eq!(MaterialType::detect(None, "archive.zip"), None);
    /// ```
    pub fn detect(content_type: Option<&str>, filename: &str) -> Option<Self> {
        content_type
            .and_then(Self::from_content_type)
            .or_else(|| Self::from_extension(filename))
    }

    fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "application/pdf" => Some(Self::Pdf),
            "application/octet-stream" | "" => None,
            other if other.starts_with("text/") => Some(Self::Text),
            other if other.starts_with("image/") => Some(Self::Image),
            other if other.starts_with("video/") => Some(Self::Video),
            _ => None,
        }
    }

    fn from_extension(filename: &str) -> Option<Self> {
        let (_, extension) = filename.rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "txt" | "md" | "markdown" | "csv" => Some(Self::Text),
            "pdf" => Some(Self::Pdf),
            "png" | "jpg" | "jpeg" | "gif" | "webp" => Some(Self::Image),
            "mp4" | "mov" | "webm" | "mkv" => Some(Self::Video),
            _ => None,
        }
    }
}

impl FromStr for MaterialType {
    type Err = MaterialValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(Self::Pdf),
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "youtube" => Ok(Self::Youtube),
            "text" => Ok(Self::Text),
            other => Err(MaterialValidationError::UnknownType(other.to_owned())),
        }
    }
}

/// Validation failures for material inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MaterialValidationError {
    #[error("filename must not be empty")]
    EmptyFilename,
    #[error("filename must be at most {max} characters")]
    FilenameTooLong { max: usize },
    #[error("filename must not contain control characters")]
    FilenameControlCharacters,
    #[error("unknown material type `{0}`")]
    UnknownType(String),
    #[error("url must be a YouTube video link")]
    NotYouTube,
}

/// Reduce a client-supplied filename to its final path segment.
///
/// # Examples
/// ```
/// use study_assistant::domain::clean_filename;
///
/// assert_eq!(clean_filename("C:\\docs\\notes.txt").unwrap(), "notes.txt");
/// assert!(clean_filename("  ").is_err());
/// ```
pub fn clean_filename(raw: &str) -> Result<String, MaterialValidationError> {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() {
        return Err(MaterialValidationError::EmptyFilename);
    }
    if name.chars().count() > FILENAME_MAX {
        return Err(MaterialValidationError::FilenameTooLong { max: FILENAME_MAX });
    }
    if name.chars().any(char::is_control) {
        return Err(MaterialValidationError::FilenameControlCharacters);
    }
    Ok(name.to_owned())
}

/// A validated YouTube video link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YouTubeLink {
    url: String,
    video_id: String,
}

impl YouTubeLink {
    /// Parse `youtube.com/watch?v=`, `youtube.com/shorts/`, `youtube.com/embed/`
    /// or `youtu.be/` links.
    ///
    /// # Examples
    /// ```
    /// use study_assistant::domain::YouTubeLink;
    ///
    /// let link = YouTubeLink::parse("https://youtu.be/dQw4w9WgXcQ").unwrap();
    /// assert_eq!(link.video_id(), "dQw4w9WgXcQ");
    /// ```
    pub fn parse(raw: &str) -> Result<Self, MaterialValidationError> {
        let url = Url::parse(raw.trim()).map_err(|_| MaterialValidationError::NotYouTube)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(MaterialValidationError::NotYouTube);
        }
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        let video_id = match host.as_str() {
            "youtu.be" => url
                .path_segments()
                .and_then(|mut segments| segments.next())
                .map(str::to_owned),
            "youtube.com" | "www.youtube.com" | "m.youtube.com" => {
                Self::video_id_from_youtube_path(&url)
            }
            _ => None,
        };
        let video_id = video_id
            .filter(|id| Self::is_video_id(id))
            .ok_or(MaterialValidationError::NotYouTube)?;
        Ok(Self {
            url: url.to_string(),
            video_id,
        })
    }

    fn video_id_from_youtube_path(url: &Url) -> Option<String> {
        let mut segments = url.path_segments()?;
        match segments.next()? {
            "watch" => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            "shorts" | "embed" | "live" => segments.next().map(str::to_owned),
            _ => None,
        }
    }

    fn is_video_id(candidate: &str) -> bool {
        !candidate.is_empty()
            && candidate.len() <= 64
            && candidate
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }
}

/// Values needed to create a material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMaterial {
    pub user_id: UserId,
    pub filename: String,
    pub material_type: MaterialType,
    pub content: String,
    pub source_url: Option<String>,
}

/// A stored study material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: MaterialId,
    pub user_id: UserId,
    #[schema(example = "notes.txt")]
    pub filename: String,
    #[serde(rename = "type")]
    pub material_type: MaterialType,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Material {
    /// Assemble a stored material from a draft.
    pub fn from_draft(id: MaterialId, draft: NewMaterial, created_at: DateTime<Utc>) -> Self {
        let NewMaterial {
            user_id,
            filename,
            material_type,
            content,
            source_url,
        } = draft;
        Self {
            id,
            user_id,
            filename,
            material_type,
            content,
            source_url,
            created_at,
        }
    }
}

impl Owned for Material {
    fn owner(&self) -> UserId {
        self.user_id
    }
}
