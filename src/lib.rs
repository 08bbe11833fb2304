//! Blogscribe - A web service that turns video links into blog posts
//!
//! This library provides a content-generation pipeline that resolves a video link,
//! extracts and transcribes its audio using the AssemblyAI service, and generates a
//! blog post from the transcript using an OpenAI chat model. Successful runs are
//! persisted per user and served over a small HTTP API.

pub mod cli;
pub mod config;
pub mod generate;
pub mod http;
pub mod pipeline;
pub mod resolver;
pub mod store;
pub mod transcribe;
pub mod utils;

pub use config::{Config, Credentials};
pub use pipeline::BlogPipeline;
pub use resolver::{AudioAsset, VideoMetadata, VideoResolver};
pub use store::{BlogPost, PostRepository};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Pipeline stage failures. Every variant is terminal for the request that
/// produced it; nothing is retried and no partial result is persisted.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Video metadata unavailable: {0}")]
    Resolution(String),

    #[error("Audio extraction failed: {0}")]
    Download(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Blog generation failed: {0}")]
    Generation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl PipelineError {
    /// The pipeline stage this error belongs to, for logging and responses.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Validation(_) => "validation",
            PipelineError::Resolution(_) => "title",
            PipelineError::Download(_) | PipelineError::Transcription(_) => "transcript",
            PipelineError::Generation(_) => "content",
            PipelineError::Storage(_) => "storage",
        }
    }
}
