/// Data models for media-service
///
/// This module defines structures for:
/// - Video: video metadata, processing state and derived artifact paths
/// - Request/response DTOs for the HTTP surface
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Processing status in the video lifecycle
///
/// Created as `Pending`, moved to `Processing` by the worker, and finished
/// as either `Completed` or `Failed`. Terminal states are never left again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// True once the record has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Closed category set for videos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum VideoCategory {
    Action,
    Comedy,
    Drama,
    Horror,
    Romance,
    Thriller,
    Documentary,
    Animation,
}

impl VideoCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Action => "Action",
            Self::Comedy => "Comedy",
            Self::Drama => "Drama",
            Self::Horror => "Horror",
            Self::Romance => "Romance",
            Self::Thriller => "Thriller",
            Self::Documentary => "Documentary",
            Self::Animation => "Animation",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Action" => Some(Self::Action),
            "Comedy" => Some(Self::Comedy),
            "Drama" => Some(Self::Drama),
            "Horror" => Some(Self::Horror),
            "Romance" => Some(Self::Romance),
            "Thriller" => Some(Self::Thriller),
            "Documentary" => Some(Self::Documentary),
            "Animation" => Some(Self::Animation),
            _ => None,
        }
    }
}

/// Video database entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Video {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    /// Relative path of the original upload inside the media store
    pub original_video: String,
    /// Relative path of the worker-generated thumbnail, if any
    pub thumbnail_path: Option<String>,
    pub processing_status: String,
    pub hls_480p_path: Option<String>,
    pub hls_720p_path: Option<String>,
    pub hls_1080p_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    pub fn status(&self) -> ProcessingStatus {
        ProcessingStatus::from_str(&self.processing_status).unwrap_or(ProcessingStatus::Pending)
    }

    /// HLS directory path recorded for a resolution label, if that profile
    /// has been encoded.
    pub fn hls_path(&self, resolution: &str) -> Option<&str> {
        match resolution {
            "480p" => self.hls_480p_path.as_deref(),
            "720p" => self.hls_720p_path.as_deref(),
            "1080p" => self.hls_1080p_path.as_deref(),
            _ => None,
        }
    }
}

/// Fields required to insert a new video record
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: VideoCategory,
    pub original_video: String,
}

/// Listing DTO, one element per completed video
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoListItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    /// Absolute URL, or null when the worker produced no thumbnail
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl VideoListItem {
    /// Build the listing view of a record, absolutizing the thumbnail path
    /// against the requesting host.
    pub fn from_video(video: Video, base_url: &str) -> Self {
        let thumbnail_url = video
            .thumbnail_path
            .as_deref()
            .map(|path| format!("{}/media/{}", base_url.trim_end_matches('/'), path));

        Self {
            id: video.id,
            title: video.title,
            description: video.description,
            category: video.category,
            thumbnail_url,
            created_at: video.created_at,
        }
    }
}

/// Detail DTO returned on create/get, includes processing state so the
/// uploader can poll for completion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoDetail {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub processing_status: String,
    pub hls_480p_path: Option<String>,
    pub hls_720p_path: Option<String>,
    pub hls_1080p_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Video> for VideoDetail {
    fn from(video: Video) -> Self {
        Self {
            id: video.id,
            title: video.title,
            description: video.description,
            category: video.category,
            processing_status: video.processing_status,
            hls_480p_path: video.hls_480p_path,
            hls_720p_path: video.hls_720p_path,
            hls_1080p_path: video.hls_1080p_path,
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}
