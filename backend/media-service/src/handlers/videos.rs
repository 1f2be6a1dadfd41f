/// Video handlers - upload, listing, detail and deletion
use actix_web::{web, HttpRequest, HttpResponse};
use actix_multipart::Multipart;
use futures::StreamExt;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::VideoDetail;
use crate::services::VideoUpload;
use crate::AppState;

/// List all completed videos, newest first.
///
/// Thumbnail URLs are absolutized against the requesting host, falling back
/// to the configured base URL when the request carries none.
pub async fn list_videos(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let conn = req.connection_info();
    let base_url = if conn.host().is_empty() {
        state.config.media.fallback_base_url.clone()
    } else {
        format!("{}://{}", conn.scheme(), conn.host())
    };

    let videos = state.streaming.list_completed(&base_url).await?;
    Ok(HttpResponse::Ok().json(videos))
}

/// Get a single video in any processing state, so uploaders can poll.
pub async fn get_video(
    state: web::Data<AppState>,
    video_id: web::Path<String>,
) -> Result<HttpResponse> {
    let id = parse_video_id(&video_id)?;
    let video = state.videos.get_video(id).await?;
    Ok(HttpResponse::Ok().json(VideoDetail::from(video)))
}

/// Create a video from a multipart upload and enqueue its transcode job.
pub async fn create_video(
    state: web::Data<AppState>,
    user: UserId,
    payload: Multipart,
) -> Result<HttpResponse> {
    let upload = read_upload(payload, state.config.media.max_upload_bytes).await?;
    let video = state.videos.create_video(upload).await?;

    tracing::info!(video_id = %video.id, uploader = %user.0, "video created");
    Ok(HttpResponse::Created().json(VideoDetail::from(video)))
}

/// Delete a video record together with its stored files.
pub async fn delete_video(
    state: web::Data<AppState>,
    user: UserId,
    video_id: web::Path<String>,
) -> Result<HttpResponse> {
    let id = parse_video_id(&video_id)?;
    state.videos.delete_video(id).await?;

    tracing::info!(video_id = %id, deleted_by = %user.0, "video deleted");
    Ok(HttpResponse::NoContent().finish())
}

fn parse_video_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Video not found".to_string()))
}

/// Collect the multipart fields of an upload. The file size cap is enforced
/// while reading so an oversized body is rejected without buffering it all.
async fn read_upload(mut payload: Multipart, max_bytes: usize) -> Result<VideoUpload> {
    let mut title = String::new();
    let mut description = String::new();
    let mut category = String::new();
    let mut filename = String::new();
    let mut data = Vec::new();

    while let Some(field) = payload.next().await {
        let mut field =
            field.map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?;

        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "title" | "description" | "category" => {
                let mut value = Vec::new();
                while let Some(chunk) = field.next().await {
                    let bytes = chunk
                        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?;
                    value.extend_from_slice(&bytes);
                }
                let value = String::from_utf8_lossy(&value).trim().to_string();
                match name.as_str() {
                    "title" => title = value,
                    "description" => description = value,
                    _ => category = value,
                }
            }
            "original_video" | "file" => {
                filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .unwrap_or("")
                    .to_string();

                while let Some(chunk) = field.next().await {
                    let bytes = chunk
                        .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?;
                    if data.len() + bytes.len() > max_bytes {
                        return Err(AppError::Validation(format!(
                            "File exceeds the maximum size of {max_bytes} bytes"
                        )));
                    }
                    data.extend_from_slice(&bytes);
                }
            }
            _ => {
                // Drain and ignore unknown fields.
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?;
                }
            }
        }
    }

    if filename.is_empty() {
        return Err(AppError::Validation(
            "A video file is required".to_string(),
        ));
    }

    Ok(VideoUpload {
        title,
        description,
        category,
        filename,
        data,
    })
}
