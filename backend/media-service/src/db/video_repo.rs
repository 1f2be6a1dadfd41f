/// Postgres-backed video repository
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::VideoStore;
use crate::error::{AppError, Result};
use crate::models::{NewVideo, ProcessingStatus, Video};

const VIDEO_COLUMNS: &str = "id, title, description, category, original_video, thumbnail_path, \
     processing_status, hls_480p_path, hls_720p_path, hls_1080p_path, created_at, updated_at";

/// Video repository over a Postgres pool
#[derive(Clone)]
pub struct PgVideoStore {
    pool: PgPool,
}

impl PgVideoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoStore for PgVideoStore {
    async fn insert(&self, video: &NewVideo) -> Result<Video> {
        let inserted = sqlx::query_as::<_, Video>(&format!(
            "INSERT INTO videos (id, title, description, category, original_video, \
             processing_status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, 'pending', NOW(), NOW()) \
             RETURNING {VIDEO_COLUMNS}"
        ))
        .bind(video.id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(video.category.as_str())
        .bind(&video.original_video)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // The unique index on LOWER(title) backs the repository-level
            // pre-check against concurrent inserts.
            if e.to_string().contains("videos_title_ci_idx") {
                AppError::Conflict("A video with this title already exists".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })?;

        Ok(inserted)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    async fn title_exists(&self, title: &str) -> Result<bool> {
        let found: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM videos WHERE LOWER(title) = LOWER($1)")
                .bind(title)
                .fetch_optional(&self.pool)
                .await?;

        Ok(found.is_some())
    }

    async fn list_completed(&self) -> Result<Vec<Video>> {
        let videos = sqlx::query_as::<_, Video>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos \
             WHERE processing_status = 'completed' \
             ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    async fn set_status(&self, id: Uuid, status: ProcessingStatus) -> Result<bool> {
        let result =
            sqlx::query("UPDATE videos SET processing_status = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(status.as_str())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_hls_path(&self, id: Uuid, resolution: &str, path: &str) -> Result<bool> {
        let column = match resolution {
            "480p" => "hls_480p_path",
            "720p" => "hls_720p_path",
            "1080p" => "hls_1080p_path",
            other => {
                return Err(AppError::Internal(format!(
                    "unknown resolution label: {other}"
                )))
            }
        };

        let result = sqlx::query(&format!(
            "UPDATE videos SET {column} = $2, updated_at = NOW() WHERE id = $1"
        ))
        .bind(id)
        .bind(path)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_thumbnail(&self, id: Uuid, path: &str) -> Result<bool> {
        let result =
            sqlx::query("UPDATE videos SET thumbnail_path = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(path)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Video>> {
        let deleted = sqlx::query_as::<_, Video>(&format!(
            "DELETE FROM videos WHERE id = $1 RETURNING {VIDEO_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(deleted)
    }
}
