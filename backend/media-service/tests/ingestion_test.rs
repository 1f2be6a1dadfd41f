//! Ingestion service tests: validation, the one-job-per-creation rule and
//! the best-effort enqueue.

mod common;

use std::sync::Arc;

use common::{test_config, test_env, BrokenJobQueue, InMemoryVideoStore};
use media_service::error::AppError;
use media_service::services::queue::TranscodeJob;
use media_service::services::{VideoService, VideoUpload};
use media_service::storage::MediaStore;
use tempfile::TempDir;

fn upload(title: &str) -> VideoUpload {
    VideoUpload {
        title: title.to_string(),
        description: "A demo upload".to_string(),
        category: "Action".to_string(),
        filename: "demo.mp4".to_string(),
        data: b"fake video content".to_vec(),
    }
}

#[tokio::test]
async fn test_create_enqueues_exactly_one_job() {
    let env = test_env();

    let video = env.state.videos.create_video(upload("Demo")).await.unwrap();

    assert_eq!(video.processing_status, "pending");
    assert_eq!(video.title, "Demo");
    assert_eq!(
        video.original_video,
        format!("videos/original/{}/demo.mp4", video.id)
    );
    assert!(env
        .media_root
        .path()
        .join(&video.original_video)
        .exists());

    let jobs = env.queue.enqueued();
    assert_eq!(jobs, vec![TranscodeJob::for_video(video.id)]);
}

#[tokio::test]
async fn test_title_uniqueness_is_case_insensitive() {
    let env = test_env();

    env.state
        .videos
        .create_video(upload("Unique Title"))
        .await
        .unwrap();

    let err = env
        .state
        .videos
        .create_video(upload("unique title"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // The rejected creation enqueued nothing.
    assert_eq!(env.queue.enqueued().len(), 1);
}

#[tokio::test]
async fn test_validation_rejections() {
    let env = test_env();

    assert!(matches!(
        env.state.videos.create_video(upload("ab")).await,
        Err(AppError::Validation(_))
    ));

    let mut bad_category = upload("Valid Title A");
    bad_category.category = "SciFi".to_string();
    assert!(matches!(
        env.state.videos.create_video(bad_category).await,
        Err(AppError::Validation(_))
    ));

    let mut bad_extension = upload("Valid Title B");
    bad_extension.filename = "clip.webm".to_string();
    assert!(matches!(
        env.state.videos.create_video(bad_extension).await,
        Err(AppError::Validation(_))
    ));

    let mut empty_file = upload("Valid Title C");
    empty_file.data.clear();
    assert!(matches!(
        env.state.videos.create_video(empty_file).await,
        Err(AppError::Validation(_))
    ));

    let mut missing_description = upload("Valid Title D");
    missing_description.description = "  ".to_string();
    assert!(matches!(
        env.state.videos.create_video(missing_description).await,
        Err(AppError::Validation(_))
    ));

    // Nothing reached the queue.
    assert!(env.queue.enqueued().is_empty());
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let media_root = TempDir::new().unwrap();
    let store = Arc::new(InMemoryVideoStore::new());
    let queue = Arc::new(common::InMemoryJobQueue::new());

    let service = VideoService::new(
        store,
        MediaStore::new(media_root.path()),
        queue.clone(),
        64,
    );

    let mut too_big = upload("Large Upload");
    too_big.data = vec![0u8; 65];
    assert!(matches!(
        service.create_video(too_big).await,
        Err(AppError::Validation(_))
    ));
    assert!(queue.enqueued().is_empty());
}

#[tokio::test]
async fn test_extension_check_is_case_insensitive() {
    let env = test_env();

    let mut upper = upload("Upper Case Extension");
    upper.filename = "CLIP.MP4".to_string();
    let video = env.state.videos.create_video(upper).await.unwrap();
    assert_eq!(video.processing_status, "pending");
}

#[tokio::test]
async fn test_queue_outage_leaves_record_pending() {
    let media_root = TempDir::new().unwrap();
    let store = Arc::new(InMemoryVideoStore::new());
    let config = test_config(media_root.path().to_path_buf());

    let service = VideoService::new(
        store.clone(),
        MediaStore::new(media_root.path()),
        Arc::new(BrokenJobQueue),
        config.media.max_upload_bytes,
    );

    // Creation succeeds even with the queue down; the record simply stays
    // pending for later reconciliation.
    let video = service.create_video(upload("Queue Down")).await.unwrap();
    assert_eq!(video.processing_status, "pending");
    assert!(store.snapshot(video.id).is_some());
}

#[tokio::test]
async fn test_delete_removes_files() {
    let env = test_env();

    let video = env
        .state
        .videos
        .create_video(upload("Delete Me"))
        .await
        .unwrap();
    let original = env.media_root.path().join(&video.original_video);
    assert!(original.exists());

    env.state.videos.delete_video(video.id).await.unwrap();
    assert!(env.store.snapshot(video.id).is_none());
    assert!(!original.exists());

    let err = env.state.videos.delete_video(video.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
