use std::sync::Arc;
use uuid::Uuid;

use crate::generate::ContentGenerator;
use crate::resolver::VideoResolver;
use crate::store::{BlogPost, NewBlogPost, PostStore};
use crate::transcribe::Transcriber;
use crate::utils::validate_and_normalize_url;
use crate::PipelineError;

/// Orchestrates one request through the content-generation pipeline:
/// title resolution, audio download, transcription, generation, persistence.
///
/// Stages run strictly in sequence and the first failure ends the request;
/// a post is persisted if and only if every stage succeeded.
pub struct BlogPipeline {
    resolver: Arc<dyn VideoResolver>,
    transcriber: Arc<dyn Transcriber>,
    generator: Arc<dyn ContentGenerator>,
    posts: Arc<dyn PostStore>,
}

impl BlogPipeline {
    pub fn new(
        resolver: Arc<dyn VideoResolver>,
        transcriber: Arc<dyn Transcriber>,
        generator: Arc<dyn ContentGenerator>,
        posts: Arc<dyn PostStore>,
    ) -> Self {
        Self {
            resolver,
            transcriber,
            generator,
            posts,
        }
    }

    /// Run the full pipeline for one submitted link on behalf of `owner_id`
    pub async fn run(&self, owner_id: Uuid, link: &str) -> Result<BlogPost, PipelineError> {
        validate_and_normalize_url(link)
            .map_err(|e| PipelineError::Validation(e.to_string()))?;

        tracing::info!(owner_id = %owner_id, link = %link, "Pipeline started");

        let meta = self.resolver.resolve_title(link).await?;
        tracing::debug!(video_id = %meta.id, title = %meta.title, "Title resolved");

        let asset = self.resolver.fetch_audio(link).await?;

        let transcribed = self.transcriber.transcribe(&asset).await;

        // The audio file is only needed for transcription; remove it whether
        // or not that stage succeeded.
        if let Err(e) = fs_err::remove_file(&asset.path) {
            tracing::warn!(path = %asset.path.display(), error = %e, "Failed to remove audio file");
        }

        let transcript = transcribed?;
        if transcript.text.trim().is_empty() {
            return Err(PipelineError::Transcription(
                "service returned an empty transcript".to_string(),
            ));
        }

        let article = self.generator.generate(&transcript.text).await?;
        if article.content.trim().is_empty() {
            return Err(PipelineError::Generation(
                "service returned empty content".to_string(),
            ));
        }

        let post = self
            .posts
            .insert(NewBlogPost {
                owner_id,
                source_title: meta.title,
                source_link: link.to_string(),
                content: article.content,
            })
            .await?;

        tracing::info!(owner_id = %owner_id, post_id = %post.id, "Pipeline finished, post stored");

        Ok(post)
    }
}
