/// HTTP handlers for media-service
pub mod streaming;
pub mod videos;

pub use streaming::{get_manifest, get_segment};
pub use videos::{create_video, delete_video, get_video, list_videos};
