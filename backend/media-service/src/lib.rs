//! Media Service
//!
//! Handles video uploads, the asynchronous transcode pipeline and
//! authenticated HLS delivery.

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use auth_token::JwtKeys;

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod services;
pub mod storage;

// Public re-exports
pub use config::Config;
pub use error::{AppError, Result};

use db::VideoStore;
use services::{JobQueue, StreamingService, VideoService};
use storage::MediaStore;

/// Shared application state handed to every handler.
///
/// The store and queue are injected so binaries wire Postgres and Redis
/// while tests wire in-memory implementations.
pub struct AppState {
    pub config: Config,
    pub videos: VideoService,
    pub streaming: StreamingService,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn VideoStore>, queue: Arc<dyn JobQueue>) -> Self {
        let media = MediaStore::new(config.media.root.clone());

        let videos = VideoService::new(
            store.clone(),
            media.clone(),
            queue,
            config.media.max_upload_bytes,
        );
        let streaming = StreamingService::new(store, media);

        Self {
            config,
            videos,
            streaming,
        }
    }
}

/// Mount the full API surface. Everything under `/api/v1/videos` sits
/// behind the JWT gate; health and the OpenAPI document stay public.
pub fn configure_api(keys: JwtKeys) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.route(
            "/api/v1/health",
            web::get().to(|| async { HttpResponse::Ok().json(serde_json::json!({"status": "ok"})) }),
        )
        .route(
            "/api/v1/openapi.json",
            web::get().to(|| async {
                use utoipa::OpenApi;
                HttpResponse::Ok()
                    .content_type("application/json")
                    .json(openapi::ApiDoc::openapi())
            }),
        )
        .service(
            web::scope("/api/v1/videos")
                .wrap(middleware::JwtAuthMiddleware::new(keys))
                .route("", web::get().to(handlers::list_videos))
                .route("", web::post().to(handlers::create_video))
                .route("/{id}", web::get().to(handlers::get_video))
                .route("/{id}", web::delete().to(handlers::delete_video))
                .route(
                    "/{id}/manifest/{resolution}",
                    web::get().to(handlers::get_manifest),
                )
                .route(
                    "/{id}/segments/{resolution}/{segment}",
                    web::get().to(handlers::get_segment),
                ),
        );
    }
}
