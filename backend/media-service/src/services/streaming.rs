/// Delivery-side read path for completed videos
///
/// Listing, manifest and segment lookups share the same resolution rules:
/// the record must exist and be completed, the resolution must be one of
/// the fixed profiles with a recorded path, and only then is the
/// filesystem consulted. Error messages never contain filesystem paths.
use std::sync::Arc;

use uuid::Uuid;

use crate::db::VideoStore;
use crate::error::{AppError, Result};
use crate::models::{ProcessingStatus, Video, VideoListItem};
use crate::storage::{is_safe_segment_name, MediaStore};

/// Resolutions a client may request.
pub const SUPPORTED_RESOLUTIONS: [&str; 3] = ["480p", "720p", "1080p"];

pub struct StreamingService {
    store: Arc<dyn VideoStore>,
    media: MediaStore,
}

impl StreamingService {
    pub fn new(store: Arc<dyn VideoStore>, media: MediaStore) -> Self {
        Self { store, media }
    }

    /// All completed videos, newest first, thumbnails absolutized against
    /// `base_url`.
    pub async fn list_completed(&self, base_url: &str) -> Result<Vec<VideoListItem>> {
        let videos = self.store.list_completed().await?;
        Ok(videos
            .into_iter()
            .map(|v| VideoListItem::from_video(v, base_url))
            .collect())
    }

    /// Manifest text for one completed video and resolution.
    pub async fn manifest(&self, video_id: Uuid, resolution: &str) -> Result<String> {
        let video = self.completed_video(video_id).await?;
        let hls_path = self.resolution_path(&video, resolution)?;

        self.media
            .read_manifest(hls_path)
            .await?
            .ok_or_else(|| AppError::NotFound("Manifest file not found".to_string()))
    }

    /// Raw bytes of one segment for a completed video and resolution.
    pub async fn segment(
        &self,
        video_id: Uuid,
        resolution: &str,
        segment_name: &str,
    ) -> Result<Vec<u8>> {
        let video = self.completed_video(video_id).await?;
        let hls_path = self.resolution_path(&video, resolution)?;

        if !is_safe_segment_name(segment_name) {
            return Err(AppError::NotFound("Segment not found".to_string()));
        }

        self.media
            .read_segment(hls_path, segment_name)
            .await?
            .ok_or_else(|| AppError::NotFound("Segment file not found".to_string()))
    }

    /// A record qualifies for delivery only once completed, regardless of
    /// what exists on disk.
    async fn completed_video(&self, video_id: Uuid) -> Result<Video> {
        let video = self
            .store
            .get(video_id)
            .await?
            .filter(|v| v.status() == ProcessingStatus::Completed)
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

        Ok(video)
    }

    fn resolution_path<'a>(&self, video: &'a Video, resolution: &str) -> Result<&'a str> {
        if !SUPPORTED_RESOLUTIONS.contains(&resolution) {
            return Err(AppError::NotFound("Resolution not available".to_string()));
        }

        video
            .hls_path(resolution)
            .ok_or_else(|| AppError::NotFound("Resolution not available".to_string()))
    }
}
