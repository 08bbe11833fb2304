use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Database settings
    pub database: DatabaseConfig,

    /// Media extraction settings
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection URL
    pub url: String,

    /// Connection pool size
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Directory downloaded audio files are written to
    pub dir: PathBuf,

    /// yt-dlp binary location
    pub yt_dlp_path: String,

    /// ffmpeg binary location, handed to yt-dlp for transcoding
    pub ffmpeg_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "0.0.0.0:8080".to_string(),
            },
            database: DatabaseConfig {
                url: "postgres://localhost/blogscribe".to_string(),
                max_connections: 10,
                acquire_timeout_seconds: 5,
            },
            media: MediaConfig {
                dir: PathBuf::from("media"),
                yt_dlp_path: "yt-dlp".to_string(),
                ffmpeg_path: "ffmpeg".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("blogscribe").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.server.bind_addr.is_empty() {
            anyhow::bail!("Server bind address must be configured");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL must be configured");
        }

        if self.media.dir.as_os_str().is_empty() {
            anyhow::bail!("Media directory must be configured");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Bind Address: {}", self.server.bind_addr);
        println!("  Media Directory: {}", self.media.dir.display());
        println!("  yt-dlp: {}", self.media.yt_dlp_path);
        println!("  ffmpeg: {}", self.media.ffmpeg_path);
        println!("  DB Pool Size: {}", self.database.max_connections);
    }
}

/// External service credentials, read from the process environment and passed
/// explicitly into each client at construction.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// AssemblyAI API key (speech-to-text)
    pub assemblyai_api_key: String,

    /// OpenAI API key (blog generation)
    pub openai_api_key: String,
}

impl Credentials {
    /// Read credentials from the environment, failing fast when either is missing.
    pub fn from_env() -> Result<Self> {
        let assemblyai_api_key = std::env::var("ASSEMBLYAI_API_KEY")
            .context("ASSEMBLYAI_API_KEY must be set")?;
        let openai_api_key = std::env::var("OPENAI_API_KEY")
            .context("OPENAI_API_KEY must be set")?;

        if assemblyai_api_key.is_empty() {
            anyhow::bail!("ASSEMBLYAI_API_KEY is set but empty");
        }
        if openai_api_key.is_empty() {
            anyhow::bail!("OPENAI_API_KEY is set but empty");
        }

        Ok(Self {
            assemblyai_api_key,
            openai_api_key,
        })
    }
}
