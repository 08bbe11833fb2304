use anyhow::Result;
use url::Url;

use crate::config::MediaConfig;

/// Validate a URL and return normalized version
pub fn validate_and_normalize_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url)
        .map_err(|_| anyhow::anyhow!("Invalid URL format: {}", url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol");
    }

    Ok(parsed.to_string())
}

/// Sanitize filename for safe filesystem usage
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            match c {
                // Keep alphanumeric characters, spaces, hyphens, underscores, and dots
                c if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' || c == '.' => c,
                // Replace everything else with underscore
                _ => '_',
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Check if the current environment has the configured external tools
pub async fn check_dependencies(media: &MediaConfig) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(&media.yt_dlp_path).await {
        missing.push(format!(
            "{} - required for video metadata and audio extraction",
            media.yt_dlp_path
        ));
    }

    if !check_command_available(&media.ffmpeg_path).await {
        missing.push(format!(
            "{} - required for transcoding extracted audio to mp3",
            media.ffmpeg_path
        ));
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
