/// Configuration management for media-service
///
/// Loads configuration from environment variables with sensible defaults.
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub queue: QueueConfig,
    pub media: MediaConfig,
    pub auth: AuthConfig,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub env: String,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone, Debug)]
pub struct QueueConfig {
    pub redis_url: String,
    /// Name of the Redis list the transcode jobs travel on.
    pub queue_name: String,
    /// BRPOP timeout for the worker loop, in seconds.
    pub dequeue_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct MediaConfig {
    /// Root directory of the media store.
    pub root: PathBuf,
    pub ffmpeg_path: String,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
    /// Host used to absolutize thumbnail URLs when the request has none.
    pub fallback_base_url: String,
    /// Longest edge of generated thumbnails, in pixels.
    pub thumbnail_max_dimension: u32,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Config {
            app: AppConfig {
                host: std::env::var("MEDIA_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("MEDIA_SERVICE_PORT")
                    .unwrap_or_else(|_| "8082".to_string())
                    .parse()
                    .unwrap_or(8082),
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/streamforge".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
            },
            queue: QueueConfig {
                redis_url: std::env::var("REDIS_URL")
                    .unwrap_or_else(|_| "redis://localhost".to_string()),
                queue_name: std::env::var("TRANSCODE_QUEUE_NAME")
                    .unwrap_or_else(|_| "transcode_jobs".to_string()),
                dequeue_timeout_secs: std::env::var("TRANSCODE_DEQUEUE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
            },
            media: MediaConfig {
                root: PathBuf::from(
                    std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string()),
                ),
                ffmpeg_path: std::env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
                // 10.5 MiB, matching the demo upload limit of the platform.
                max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(11_010_048),
                fallback_base_url: std::env::var("MEDIA_FALLBACK_BASE_URL")
                    .unwrap_or_else(|_| "http://127.0.0.1:8082".to_string()),
                thumbnail_max_dimension: std::env::var("THUMB_MAX_DIMENSION")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(600),
            },
            auth: AuthConfig {
                jwt_secret: std::env::var("JWT_SECRET")
                    .unwrap_or_else(|_| "insecure-dev-secret".to_string()),
            },
        })
    }
}
