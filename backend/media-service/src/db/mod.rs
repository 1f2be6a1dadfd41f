/// Database access layer
///
/// The record store is modeled as the `VideoStore` trait so the worker and
/// the delivery layer depend on an injected collaborator rather than on a
/// concrete pool. `PgVideoStore` is the production implementation.
use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{NewVideo, ProcessingStatus, Video};

pub mod video_repo;

pub use video_repo::PgVideoStore;

/// Durable store of video records.
///
/// Ownership rules: the ingestion path inserts, the worker is the only
/// mutator of `processing_status` and the artifact paths, the delivery
/// layer only reads.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Insert a new record with status `pending`.
    async fn insert(&self, video: &NewVideo) -> Result<Video>;

    /// Fetch a record by id.
    async fn get(&self, id: Uuid) -> Result<Option<Video>>;

    /// Case-insensitive title existence check.
    async fn title_exists(&self, title: &str) -> Result<bool>;

    /// All completed records, newest first.
    async fn list_completed(&self) -> Result<Vec<Video>>;

    /// Set the processing status. Returns false when the record is gone.
    async fn set_status(&self, id: Uuid, status: ProcessingStatus) -> Result<bool>;

    /// Record the HLS directory for one resolution label.
    async fn set_hls_path(&self, id: Uuid, resolution: &str, path: &str) -> Result<bool>;

    /// Record the generated thumbnail path.
    async fn set_thumbnail(&self, id: Uuid, path: &str) -> Result<bool>;

    /// Delete a record, returning it so callers can clean up its files.
    async fn delete(&self, id: Uuid) -> Result<Option<Video>>;
}
