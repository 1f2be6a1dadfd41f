/// Route table for auth-service
use actix_web::{web, HttpResponse};

use crate::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
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
                .json(crate::openapi::ApiDoc::openapi())
        }),
    )
    .service(
        web::scope("/api/v1/auth")
            .route("/register", web::post().to(handlers::register))
            .route("/activate/{uid}/{token}", web::get().to(handlers::activate))
            .route("/login", web::post().to(handlers::login))
            .route("/refresh", web::post().to(handlers::refresh))
            .route("/logout", web::post().to(handlers::logout))
            .route("/password-reset", web::post().to(handlers::password_reset))
            .route(
                "/password-reset/confirm/{uid}/{token}",
                web::post().to(handlers::password_reset_confirm),
            ),
    );
}
