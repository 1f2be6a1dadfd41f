//! Shared fixtures: in-memory store and queue, a scriptable encoder and an
//! `AppState` wired against a temporary media root.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tempfile::TempDir;
use uuid::Uuid;

use media_service::config::Config;
use media_service::db::VideoStore;
use media_service::error::{AppError, Result};
use media_service::models::{NewVideo, ProcessingStatus, Video};
use media_service::services::encoder::{Encoder, EncodeProfile};
use media_service::services::queue::{JobQueue, TranscodeJob};
use media_service::storage::MediaStore;
use media_service::AppState;

pub const JWT_TEST_SECRET: &str = "media-service-test-secret";

/// In-memory record store mirroring the Postgres repository semantics.
#[derive(Default)]
pub struct InMemoryVideoStore {
    videos: Mutex<HashMap<Uuid, Video>>,
}

impl InMemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing ingestion.
    pub fn put(&self, video: Video) {
        self.videos.lock().unwrap().insert(video.id, video);
    }

    pub fn snapshot(&self, id: Uuid) -> Option<Video> {
        self.videos.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl VideoStore for InMemoryVideoStore {
    async fn insert(&self, new: &NewVideo) -> Result<Video> {
        let mut videos = self.videos.lock().unwrap();
        if videos
            .values()
            .any(|v| v.title.to_lowercase() == new.title.to_lowercase())
        {
            return Err(AppError::Conflict(
                "A video with this title already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let video = Video {
            id: new.id,
            title: new.title.clone(),
            description: new.description.clone(),
            category: new.category.as_str().to_string(),
            original_video: new.original_video.clone(),
            thumbnail_path: None,
            processing_status: ProcessingStatus::Pending.as_str().to_string(),
            hls_480p_path: None,
            hls_720p_path: None,
            hls_1080p_path: None,
            created_at: now,
            updated_at: now,
        };
        videos.insert(video.id, video.clone());
        Ok(video)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Video>> {
        Ok(self.videos.lock().unwrap().get(&id).cloned())
    }

    async fn title_exists(&self, title: &str) -> Result<bool> {
        Ok(self
            .videos
            .lock()
            .unwrap()
            .values()
            .any(|v| v.title.to_lowercase() == title.to_lowercase()))
    }

    async fn list_completed(&self) -> Result<Vec<Video>> {
        let mut completed: Vec<Video> = self
            .videos
            .lock()
            .unwrap()
            .values()
            .filter(|v| v.processing_status == "completed")
            .cloned()
            .collect();
        completed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(completed)
    }

    async fn set_status(&self, id: Uuid, status: ProcessingStatus) -> Result<bool> {
        Ok(self.update(id, |v| v.processing_status = status.as_str().to_string()))
    }

    async fn set_hls_path(&self, id: Uuid, resolution: &str, path: &str) -> Result<bool> {
        let path = path.to_string();
        Ok(self.update(id, |v| match resolution {
            "480p" => v.hls_480p_path = Some(path.clone()),
            "720p" => v.hls_720p_path = Some(path.clone()),
            "1080p" => v.hls_1080p_path = Some(path.clone()),
            _ => {}
        }))
    }

    async fn set_thumbnail(&self, id: Uuid, path: &str) -> Result<bool> {
        let path = path.to_string();
        Ok(self.update(id, |v| v.thumbnail_path = Some(path.clone())))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Video>> {
        Ok(self.videos.lock().unwrap().remove(&id))
    }
}

impl InMemoryVideoStore {
    fn update(&self, id: Uuid, f: impl FnOnce(&mut Video)) -> bool {
        let mut videos = self.videos.lock().unwrap();
        match videos.get_mut(&id) {
            Some(video) => {
                f(video);
                video.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

/// In-memory queue that records every enqueued job.
#[derive(Default)]
pub struct InMemoryJobQueue {
    jobs: Mutex<Vec<TranscodeJob>>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueued(&self) -> Vec<TranscodeJob> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue(&self, job: &TranscodeJob) -> Result<()> {
        self.jobs.lock().unwrap().push(job.clone());
        Ok(())
    }

    async fn dequeue(&self, _timeout: Duration) -> Result<Option<TranscodeJob>> {
        let mut jobs = self.jobs.lock().unwrap();
        if jobs.is_empty() {
            Ok(None)
        } else {
            Ok(Some(jobs.remove(0)))
        }
    }
}

/// A queue that is always down, for the best-effort enqueue path.
pub struct BrokenJobQueue;

#[async_trait]
impl JobQueue for BrokenJobQueue {
    async fn enqueue(&self, _job: &TranscodeJob) -> Result<()> {
        Err(AppError::Queue("connection refused".to_string()))
    }

    async fn dequeue(&self, _timeout: Duration) -> Result<Option<TranscodeJob>> {
        Err(AppError::Queue("connection refused".to_string()))
    }
}

/// Scriptable encoder. Writes plausible HLS output on success so delivery
/// tests can read real files, and can be told to fail at one profile or at
/// frame extraction.
pub struct MockEncoder {
    pub fail_on_profile: Option<&'static str>,
    pub fail_frame_extraction: bool,
    calls: Mutex<Vec<String>>,
}

pub const MOCK_MANIFEST: &str = "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-TARGETDURATION:10\n#EXTINF:10.0,\n000.ts\n#EXT-X-ENDLIST\n";

impl MockEncoder {
    pub fn succeeding() -> Self {
        Self {
            fail_on_profile: None,
            fail_frame_extraction: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_at(profile: &'static str) -> Self {
        Self {
            fail_on_profile: Some(profile),
            ..Self::succeeding()
        }
    }

    pub fn without_thumbnails() -> Self {
        Self {
            fail_frame_extraction: true,
            ..Self::succeeding()
        }
    }

    pub fn encoded_profiles(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Encoder for MockEncoder {
    async fn encode_hls(
        &self,
        _input: &Path,
        output_dir: &Path,
        profile: &EncodeProfile,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(profile.label.to_string());

        if self.fail_on_profile == Some(profile.label) {
            return Err(AppError::Encoder(format!(
                "mock encoder failure at {}",
                profile.label
            )));
        }

        tokio::fs::create_dir_all(output_dir).await?;
        tokio::fs::write(output_dir.join("index.m3u8"), MOCK_MANIFEST).await?;
        tokio::fs::write(output_dir.join("000.ts"), b"mock segment bytes").await?;
        Ok(())
    }

    async fn extract_frame(&self, _input: &Path, output: &Path) -> Result<()> {
        if self.fail_frame_extraction {
            return Err(AppError::Encoder("mock frame extraction failure".to_string()));
        }

        // A real decodable image; the worker re-encodes it with `image`.
        let frame = image::DynamicImage::ImageRgb8(image::RgbImage::new(4, 4));
        frame
            .save(output)
            .map_err(|e| AppError::Internal(format!("mock frame write failed: {e}")))?;
        Ok(())
    }
}

/// Everything a test needs: temp media root, store, queue and state.
pub struct TestEnv {
    pub media_root: TempDir,
    pub store: Arc<InMemoryVideoStore>,
    pub queue: Arc<InMemoryJobQueue>,
    pub state: actix_web::web::Data<AppState>,
}

pub fn test_config(root: PathBuf) -> Config {
    let mut config = Config::from_env().expect("config from env");
    config.media.root = root;
    config.media.fallback_base_url = "http://testserver".to_string();
    config.auth.jwt_secret = JWT_TEST_SECRET.to_string();
    config
}

pub fn test_env() -> TestEnv {
    let media_root = TempDir::new().expect("temp media root");
    let store = Arc::new(InMemoryVideoStore::new());
    let queue = Arc::new(InMemoryJobQueue::new());

    let config = test_config(media_root.path().to_path_buf());
    let state = actix_web::web::Data::new(AppState::new(
        config,
        store.clone(),
        queue.clone(),
    ));

    TestEnv {
        media_root,
        store,
        queue,
        state,
    }
}

/// Seed a completed record with HLS paths recorded, as the worker leaves it.
pub fn completed_video(id: Uuid) -> Video {
    let now = Utc::now();
    Video {
        id,
        title: format!("Video {id}"),
        description: "A finished video".to_string(),
        category: "Action".to_string(),
        original_video: format!("videos/original/{id}/in.mp4"),
        thumbnail_path: Some(format!("videos/thumbnails/{id}/thumbnail.jpg")),
        processing_status: "completed".to_string(),
        hls_480p_path: Some(format!("videos/processed/{id}/480p")),
        hls_720p_path: Some(format!("videos/processed/{id}/720p")),
        hls_1080p_path: Some(format!("videos/processed/{id}/1080p")),
        created_at: now,
        updated_at: now,
    }
}

/// A fresh record still waiting for the worker.
pub fn pending_video(id: Uuid) -> Video {
    Video {
        processing_status: "pending".to_string(),
        thumbnail_path: None,
        hls_480p_path: None,
        hls_720p_path: None,
        hls_1080p_path: None,
        ..completed_video(id)
    }
}

pub fn access_token_for(user_id: Uuid) -> String {
    auth_token::JwtKeys::from_secret(JWT_TEST_SECRET)
        .generate_access_token(user_id, "viewer@example.com")
        .expect("token")
}
