/// Streaming handlers - HLS manifest and segment delivery
use actix_web::http::header;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::AppState;

/// Content type of HLS playlists.
pub const MANIFEST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

/// Content type of MPEG transport stream segments.
pub const SEGMENT_CONTENT_TYPE: &str = "video/MP2T";

/// Serve the `index.m3u8` playlist of one resolution.
pub async fn get_manifest(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (video_id, resolution) = path.into_inner();
    let video_id = parse_video_id(&video_id)?;

    let manifest = state.streaming.manifest(video_id, &resolution).await?;

    Ok(HttpResponse::Ok()
        .content_type(MANIFEST_CONTENT_TYPE)
        .insert_header((header::CONTENT_DISPOSITION, "inline"))
        .body(manifest))
}

/// Serve one `.ts` segment of one resolution.
pub async fn get_segment(
    state: web::Data<AppState>,
    path: web::Path<(String, String, String)>,
) -> Result<HttpResponse> {
    let (video_id, resolution, segment) = path.into_inner();
    let video_id = parse_video_id(&video_id)?;

    let bytes = state
        .streaming
        .segment(video_id, &resolution, &segment)
        .await?;

    Ok(HttpResponse::Ok()
        .content_type(SEGMENT_CONTENT_TYPE)
        .insert_header((header::CONTENT_DISPOSITION, "inline"))
        .body(bytes))
}

fn parse_video_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Video not found".to_string()))
}
