/// Transcode worker
///
/// Consumes jobs from the queue and drives the encoder through the three
/// fixed profiles, updating record state as it goes. State invariants:
/// every exit path leaves the record in `failed` or `completed` (or skips
/// untouched when another run already claimed it); a profile that succeeded
/// keeps its recorded path even if a later profile fails.
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageOutputFormat;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db::VideoStore;
use crate::error::{AppError, Result};
use crate::models::ProcessingStatus;
use crate::services::encoder::{Encoder, ENCODE_PROFILES};
use crate::services::queue::TranscodeJob;
use crate::storage::MediaStore;

pub struct TranscodeWorker {
    store: Arc<dyn VideoStore>,
    media: MediaStore,
    encoder: Arc<dyn Encoder>,
    thumbnail_max_dimension: u32,
}

impl TranscodeWorker {
    pub fn new(
        store: Arc<dyn VideoStore>,
        media: MediaStore,
        encoder: Arc<dyn Encoder>,
        thumbnail_max_dimension: u32,
    ) -> Self {
        Self {
            store,
            media,
            encoder,
            thumbnail_max_dimension,
        }
    }

    /// Process one job. This is the job boundary: any error escaping the
    /// video routine is logged and the record is best-effort forced to
    /// `failed` so nothing stays stuck in `processing`.
    pub async fn run_job(&self, job: &TranscodeJob) -> Result<()> {
        match job {
            TranscodeJob::Video { video_id } => {
                match self.process_video(*video_id).await {
                    Ok(()) => Ok(()),
                    Err(e) => {
                        error!(video_id = %video_id, "transcoding failed: {}", e);
                        if let Err(db_err) = self
                            .store
                            .set_status(*video_id, ProcessingStatus::Failed)
                            .await
                        {
                            error!(video_id = %video_id, "failed to mark record failed: {}", db_err);
                        }
                        Err(e)
                    }
                }
            }
            TranscodeJob::RawFile { path } => self.encode_raw_file(Path::new(path)).await,
        }
    }

    async fn process_video(&self, video_id: Uuid) -> Result<()> {
        let video = self
            .store
            .get(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Video record disappeared".to_string()))?;

        // Delivery is at-least-once; skip records another run already
        // claimed or finished.
        let status = video.status();
        if matches!(status, ProcessingStatus::Completed | ProcessingStatus::Processing) {
            info!(
                video_id = %video_id,
                status = status.as_str(),
                "skipping job, record already claimed"
            );
            return Ok(());
        }

        self.store
            .set_status(video_id, ProcessingStatus::Processing)
            .await?;

        let input = self.media.absolute(&video.original_video);

        for profile in &ENCODE_PROFILES {
            let output_dir = self.media.ensure_processed_dir(video_id, profile.label).await?;
            self.encoder.encode_hls(&input, &output_dir, profile).await?;

            // Persist immediately so partial success survives a later
            // profile failing.
            let rel = self.media.processed_rel_path(video_id, profile.label);
            self.store.set_hls_path(video_id, profile.label, &rel).await?;

            info!(video_id = %video_id, profile = profile.label, "profile encoded");
        }

        // Thumbnail failure must not fail the job.
        self.generate_thumbnail(video_id, &input).await;

        self.store
            .set_status(video_id, ProcessingStatus::Completed)
            .await?;

        info!(video_id = %video_id, "transcoding pipeline completed");
        Ok(())
    }

    /// Extract a frame, bound it to the configured dimension, store it and
    /// record the path. Errors are isolated: logged, partial temp artifacts
    /// removed, the record's thumbnail left unset.
    async fn generate_thumbnail(&self, video_id: Uuid, input: &Path) {
        let frame_path = std::env::temp_dir().join(format!("thumb_{video_id}.jpg"));

        let result = self.thumbnail_from_frame(video_id, input, &frame_path).await;

        if frame_path.exists() {
            if let Err(e) = tokio::fs::remove_file(&frame_path).await {
                warn!(video_id = %video_id, "failed to remove temp frame: {}", e);
            }
        }

        if let Err(e) = result {
            warn!(video_id = %video_id, "thumbnail generation failed: {}", e);
        }
    }

    async fn thumbnail_from_frame(
        &self,
        video_id: Uuid,
        input: &Path,
        frame_path: &Path,
    ) -> Result<()> {
        self.encoder.extract_frame(input, frame_path).await?;

        let frame = tokio::fs::read(frame_path).await?;
        let max_dimension = self.thumbnail_max_dimension;

        // Decoding and resizing are CPU work; keep them off the runtime.
        let jpeg = tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
            let img = image::load_from_memory(&frame)
                .map_err(|e| AppError::Internal(format!("frame decode failed: {e}")))?;
            let img = img.thumbnail(max_dimension, max_dimension);

            let mut buf = Cursor::new(Vec::new());
            img.write_to(&mut buf, ImageOutputFormat::Jpeg(85))
                .map_err(|e| AppError::Internal(format!("thumbnail encode failed: {e}")))?;
            Ok(buf.into_inner())
        })
        .await
        .map_err(|e| AppError::Internal(format!("thumbnail task panicked: {e}")))??;

        let rel = self.media.save_thumbnail(video_id, &jpeg).await?;
        self.store.set_thumbnail(video_id, &rel).await?;

        info!(video_id = %video_id, "thumbnail stored");
        Ok(())
    }

    /// Alternate ingestion path: encode a bare file through the same
    /// profiles, writing the HLS tree next to the source. No record state.
    async fn encode_raw_file(&self, input: &Path) -> Result<()> {
        if !input.exists() {
            return Err(AppError::NotFound("Input video not found".to_string()));
        }

        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| AppError::Validation("Invalid input file name".to_string()))?;
        let base = input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(format!("{stem}_hls"));

        for profile in &ENCODE_PROFILES {
            let output_dir: PathBuf = base.join(profile.label);
            tokio::fs::create_dir_all(&output_dir).await?;
            self.encoder.encode_hls(input, &output_dir, profile).await?;

            info!(input = %input.display(), profile = profile.label, "profile encoded");
        }

        Ok(())
    }
}
