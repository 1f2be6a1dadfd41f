/// External encoder invocation
///
/// Wraps the ffmpeg command line behind the `Encoder` trait. The transcode
/// worker is the only component that invokes it.
use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::storage::MANIFEST_FILE;

/// Fixed segment duration for HLS output, in seconds.
pub const HLS_SEGMENT_SECONDS: u32 = 10;

/// Audio bitrate shared by all profiles.
pub const AUDIO_BITRATE: &str = "128k";

/// One (resolution, bitrate) encoding target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeProfile {
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
    pub video_bitrate_kbps: u32,
}

/// The three fixed delivery profiles, lowest first.
pub const ENCODE_PROFILES: [EncodeProfile; 3] = [
    EncodeProfile {
        label: "480p",
        width: 854,
        height: 480,
        video_bitrate_kbps: 1000,
    },
    EncodeProfile {
        label: "720p",
        width: 1280,
        height: 720,
        video_bitrate_kbps: 2500,
    },
    EncodeProfile {
        label: "1080p",
        width: 1920,
        height: 1080,
        video_bitrate_kbps: 5000,
    },
];

/// External transcoder boundary.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Produce an HLS rendition of `input` for one profile inside
    /// `output_dir` (playlist `index.m3u8`, segments `NNN.ts`).
    async fn encode_hls(
        &self,
        input: &Path,
        output_dir: &Path,
        profile: &EncodeProfile,
    ) -> Result<()>;

    /// Extract a single frame from `input` into `output`.
    async fn extract_frame(&self, input: &Path, output: &Path) -> Result<()>;
}

/// ffmpeg-backed encoder.
pub struct FfmpegEncoder {
    ffmpeg_path: String,
}

impl FfmpegEncoder {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    /// ffmpeg argument list for one HLS rendition: H.264 video at the
    /// profile bitrate, AAC audio, 10-second segments, an unbounded VOD
    /// playlist, and overwrite of previous output.
    fn hls_args(input: &Path, output_dir: &Path, profile: &EncodeProfile) -> Vec<String> {
        let segment_pattern = output_dir.join("%03d.ts");
        let playlist = output_dir.join(MANIFEST_FILE);

        vec![
            "-i".into(),
            input.to_string_lossy().into_owned(),
            "-c:v".into(),
            "libx264".into(),
            "-c:a".into(),
            "aac".into(),
            "-vf".into(),
            format!("scale={}:{}", profile.width, profile.height),
            "-b:v".into(),
            format!("{}k", profile.video_bitrate_kbps),
            "-b:a".into(),
            AUDIO_BITRATE.into(),
            "-hls_time".into(),
            HLS_SEGMENT_SECONDS.to_string(),
            "-hls_list_size".into(),
            "0".into(),
            "-hls_segment_filename".into(),
            segment_pattern.to_string_lossy().into_owned(),
            "-f".into(),
            "hls".into(),
            playlist.to_string_lossy().into_owned(),
            "-y".into(),
        ]
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    async fn encode_hls(
        &self,
        input: &Path,
        output_dir: &Path,
        profile: &EncodeProfile,
    ) -> Result<()> {
        let args = Self::hls_args(input, output_dir, profile);
        debug!(profile = profile.label, input = %input.display(), "invoking ffmpeg");

        let output = Command::new(&self.ffmpeg_path)
            .args(&args)
            .output()
            .await
            .map_err(|e| AppError::Encoder(format!("ffmpeg spawn error: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Encoder(format!(
                "ffmpeg exited with {} for {}: {}",
                output.status, profile.label, stderr
            )));
        }

        Ok(())
    }

    async fn extract_frame(&self, input: &Path, output: &Path) -> Result<()> {
        let output_result = Command::new(&self.ffmpeg_path)
            .args([
                "-y",
                "-ss",
                "00:00:01",
                "-i",
                input.to_string_lossy().as_ref(),
                "-frames:v",
                "1",
                output.to_string_lossy().as_ref(),
            ])
            .output()
            .await
            .map_err(|e| AppError::Encoder(format!("ffmpeg spawn error: {e}")))?;

        if !output_result.status.success() {
            let stderr = String::from_utf8_lossy(&output_result.stderr);
            return Err(AppError::Encoder(format!(
                "ffmpeg frame extraction failed: {stderr}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_profiles_are_fixed() {
        assert_eq!(ENCODE_PROFILES.len(), 3);

        let p480 = &ENCODE_PROFILES[0];
        assert_eq!((p480.label, p480.width, p480.height), ("480p", 854, 480));
        assert_eq!(p480.video_bitrate_kbps, 1000);

        let p720 = &ENCODE_PROFILES[1];
        assert_eq!((p720.label, p720.width, p720.height), ("720p", 1280, 720));
        assert_eq!(p720.video_bitrate_kbps, 2500);

        let p1080 = &ENCODE_PROFILES[2];
        assert_eq!((p1080.label, p1080.width, p1080.height), ("1080p", 1920, 1080));
        assert_eq!(p1080.video_bitrate_kbps, 5000);
    }

    #[test]
    fn test_hls_args_shape() {
        let input = PathBuf::from("/media/videos/original/x/in.mp4");
        let out = PathBuf::from("/media/videos/processed/x/720p");
        let args = FfmpegEncoder::hls_args(&input, &out, &ENCODE_PROFILES[1]);

        let joined = args.join(" ");
        assert!(joined.contains("-vf scale=1280:720"));
        assert!(joined.contains("-b:v 2500k"));
        assert!(joined.contains("-b:a 128k"));
        assert!(joined.contains("-hls_time 10"));
        assert!(joined.contains("-hls_list_size 0"));
        assert!(joined.contains("%03d.ts"));
        assert!(joined.ends_with("-y"));
        assert!(joined.contains("index.m3u8"));
    }
}
