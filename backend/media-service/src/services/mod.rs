/// Service layer for the video pipeline
///
/// - `VideoService`: ingestion and deletion (repository insert, then
///   best-effort enqueue, as two visible sequenced steps)
/// - `StreamingService`: delivery-side reads
/// - `TranscodeWorker` + `Encoder`: the asynchronous pipeline
/// - `JobQueue`: the durable channel between them
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::db::VideoStore;
use crate::error::{AppError, Result};
use crate::models::{NewVideo, Video, VideoCategory};
use crate::storage::MediaStore;

pub mod encoder;
pub mod queue;
pub mod streaming;
pub mod worker;

pub use encoder::{Encoder, EncodeProfile, FfmpegEncoder, ENCODE_PROFILES};
pub use queue::{JobQueue, RedisJobQueue, TranscodeJob};
pub use streaming::{StreamingService, SUPPORTED_RESOLUTIONS};
pub use worker::TranscodeWorker;

/// Upload extensions the ingestion path accepts.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["mp4", "avi", "mov", "mkv"];

/// Metadata and file content of one upload.
#[derive(Debug, Clone)]
pub struct VideoUpload {
    pub title: String,
    pub description: String,
    pub category: String,
    pub filename: String,
    pub data: Vec<u8>,
}

/// Ingestion-side service: owns record creation and deletion.
pub struct VideoService {
    store: Arc<dyn VideoStore>,
    media: MediaStore,
    queue: Arc<dyn JobQueue>,
    max_upload_bytes: usize,
}

impl VideoService {
    pub fn new(
        store: Arc<dyn VideoStore>,
        media: MediaStore,
        queue: Arc<dyn JobQueue>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            store,
            media,
            queue,
            max_upload_bytes,
        }
    }

    /// Create a video record from an upload and enqueue exactly one
    /// transcode job for it.
    ///
    /// The enqueue is best effort: a queue outage is logged and swallowed,
    /// leaving the record in `pending` for later reconciliation. The
    /// response never waits for transcoding.
    pub async fn create_video(&self, upload: VideoUpload) -> Result<Video> {
        let category = self.validate(&upload)?;

        if self.store.title_exists(&upload.title).await? {
            return Err(AppError::Conflict(
                "A video with this title already exists".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let original_video = self
            .media
            .save_original(id, &upload.filename, &upload.data)
            .await?;

        let new_video = NewVideo {
            id,
            title: upload.title.trim().to_string(),
            description: upload.description,
            category,
            original_video,
        };

        let video = match self.store.insert(&new_video).await {
            Ok(video) => video,
            Err(e) => {
                // The record never existed; do not keep the orphaned file.
                if let Err(fs_err) = self.media.remove_video_files(id).await {
                    warn!(video_id = %id, "cleanup after failed insert: {}", fs_err);
                }
                return Err(e);
            }
        };

        let job = TranscodeJob::for_video(video.id);
        if let Err(e) = self.queue.enqueue(&job).await {
            warn!(video_id = %video.id, "failed to enqueue transcode job: {}", e);
        } else {
            info!(video_id = %video.id, "transcode job enqueued");
        }

        Ok(video)
    }

    /// Fetch one record in any processing state.
    pub async fn get_video(&self, id: Uuid) -> Result<Video> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))
    }

    /// Delete the record together with its media store trees.
    pub async fn delete_video(&self, id: Uuid) -> Result<()> {
        let deleted = self
            .store
            .delete(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

        self.media.remove_video_files(deleted.id).await?;
        info!(video_id = %id, "video and media files deleted");
        Ok(())
    }

    fn validate(&self, upload: &VideoUpload) -> Result<VideoCategory> {
        if upload.title.trim().chars().count() < 3 {
            return Err(AppError::Validation(
                "The title must contain at least 3 characters".to_string(),
            ));
        }
        if upload.description.trim().is_empty() {
            return Err(AppError::Validation(
                "A description is required".to_string(),
            ));
        }

        let category = VideoCategory::from_str(&upload.category)
            .ok_or_else(|| AppError::Validation("Unknown category".to_string()))?;

        let extension = Path::new(&upload.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AppError::Validation(format!(
                "Unsupported file extension, allowed: {}",
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        if upload.data.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }
        if upload.data.len() > self.max_upload_bytes {
            return Err(AppError::Validation(format!(
                "File exceeds the maximum size of {} bytes",
                self.max_upload_bytes
            )));
        }

        Ok(category)
    }
}
