use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
/// OpenAPI documentation for the Streamforge Media Service
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Streamforge Media Service API",
        version = "1.0.0",
        description = "Media processing service for video upload, transcoding and HLS delivery. Uploads are transcoded asynchronously into 480p/720p/1080p HLS renditions with a generated thumbnail; completed videos are streamed to authenticated clients.",
        contact(
            name = "Streamforge Team",
            email = "team@streamforge.dev"
        ),
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8082", description = "Development server"),
    ),
    tags(
        (name = "health", description = "Service health checks"),
        (name = "videos", description = "Video upload, processing state and deletion"),
        (name = "streaming", description = "HLS manifest and segment delivery"),
    ),
    components(schemas(
        crate::models::ProcessingStatus,
        crate::models::VideoCategory,
        crate::models::VideoListItem,
        crate::models::VideoDetail,
    )),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "access_token",
                    "JWT access token issued by the auth service",
                ))),
            )
        }
    }
}
