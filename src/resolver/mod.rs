use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

use crate::config::MediaConfig;
use crate::utils::sanitize_filename;
use crate::PipelineError;

/// Metadata resolved for a video link without downloading it
#[derive(Debug, Clone)]
pub struct VideoMetadata {
    /// Stable identifier assigned by the source platform
    pub id: String,

    /// Human-readable title
    pub title: String,
}

/// A downloaded audio track. Extraction always transcodes to mp3.
#[derive(Debug, Clone)]
pub struct AudioAsset {
    /// Location of the file in the configured media directory
    pub path: PathBuf,
}

impl AudioAsset {
    pub const FORMAT: &'static str = "mp3";
}

/// Trait for resolving video links into metadata and local audio
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoResolver: Send + Sync {
    /// Resolve the video's id and title without downloading anything
    async fn resolve_title(&self, link: &str) -> Result<VideoMetadata, PipelineError>;

    /// Extract the audio track to a local mp3 file in the media directory
    async fn fetch_audio(&self, link: &str) -> Result<AudioAsset, PipelineError>;
}

/// Video resolver backed by the yt-dlp binary
pub struct YtDlpResolver {
    yt_dlp_path: String,
    ffmpeg_path: String,
    media_dir: PathBuf,
}

impl YtDlpResolver {
    pub fn new(media: &MediaConfig) -> Self {
        Self {
            yt_dlp_path: media.yt_dlp_path.clone(),
            ffmpeg_path: media.ffmpeg_path.clone(),
            media_dir: media.dir.clone(),
        }
    }

    /// Fetch video information as JSON without downloading
    async fn probe(&self, link: &str) -> Result<Value, PipelineError> {
        tracing::debug!(link = %link, "Probing video metadata");

        let output = Command::new(&self.yt_dlp_path)
            .args([
                "--dump-json",
                "--no-playlist",
                "--skip-download",
                link,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                PipelineError::Resolution(format!("failed to run {}: {}", self.yt_dlp_path, e))
            })?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::Resolution(format!(
                "yt-dlp failed: {}",
                error.trim()
            )));
        }

        let json_str = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&json_str)
            .map_err(|e| PipelineError::Resolution(format!("unparseable yt-dlp output: {}", e)))
    }

    /// Pull id and title out of a probe result
    fn id_and_title(info: &Value) -> Option<(String, String)> {
        let id = info["id"].as_str()?;
        let title = info["title"].as_str()?;
        Some((id.to_string(), title.to_string()))
    }

    /// Output template passed to yt-dlp: `{id}. {title}`, no extension.
    /// The audio post-processor names the converted file by swapping the
    /// source extension for the target format, so an extension in the
    /// template would collide with the conversion target.
    fn audio_stem_for(&self, meta: &VideoMetadata) -> PathBuf {
        let stem = format!("{}. {}", meta.id, sanitize_filename(&meta.title));
        self.media_dir.join(stem)
    }

    /// Final path of a downloaded audio track: `{id}. {title}.mp3`
    fn audio_path_for(&self, meta: &VideoMetadata) -> PathBuf {
        let mut path = self.audio_stem_for(meta).into_os_string();
        path.push(format!(".{}", AudioAsset::FORMAT));
        PathBuf::from(path)
    }
}

#[async_trait]
impl VideoResolver for YtDlpResolver {
    async fn resolve_title(&self, link: &str) -> Result<VideoMetadata, PipelineError> {
        let info = self.probe(link).await?;

        let (id, title) = Self::id_and_title(&info).ok_or_else(|| {
            PipelineError::Resolution("video metadata has no id or title".to_string())
        })?;

        Ok(VideoMetadata { id, title })
    }

    async fn fetch_audio(&self, link: &str) -> Result<AudioAsset, PipelineError> {
        // The probe re-resolves id/title so the output filename is known up front
        let info = self.probe(link).await.map_err(|e| match e {
            PipelineError::Resolution(msg) => PipelineError::Download(msg),
            other => other,
        })?;

        let (id, title) = Self::id_and_title(&info).ok_or_else(|| {
            PipelineError::Download("video metadata has no id or title".to_string())
        })?;

        let meta = VideoMetadata { id, title };
        let template = self.audio_stem_for(&meta);
        let target = self.audio_path_for(&meta);

        tracing::info!(link = %link, target = %target.display(), "Extracting audio");

        let output = Command::new(&self.yt_dlp_path)
            .args([
                "--output",
                &template.to_string_lossy(),
                "--extract-audio",
                "--audio-format",
                "mp3",
                "--audio-quality",
                "192K",
                "--ffmpeg-location",
                &self.ffmpeg_path,
                "--format",
                "bestaudio/best",
                "--no-playlist",
                link,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                PipelineError::Download(format!("failed to run {}: {}", self.yt_dlp_path, e))
            })?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::Download(format!(
                "yt-dlp failed: {}",
                error.trim()
            )));
        }

        if !target.exists() {
            return Err(PipelineError::Download(format!(
                "extraction produced no file at {}",
                target.display()
            )));
        }

        Ok(AudioAsset { path: target })
    }
}
