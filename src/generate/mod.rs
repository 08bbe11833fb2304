use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::PipelineError;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const HTTP_TIMEOUT_SECS: u64 = 120;

const MODEL: &str = "gpt-3.5-turbo";
const TEMPERATURE: f64 = 0.7;
const PROMPT_PREFIX: &str = "Write a blog post based on this transcription: ";

/// Blog post text produced from one transcript
#[derive(Debug, Clone)]
pub struct GeneratedArticle {
    pub content: String,
}

/// Trait for turning transcript text into a blog article
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate blog content from a transcript. Any service failure or a
    /// response with no usable content is an error, never returned as content.
    async fn generate(&self, transcript: &str) -> Result<GeneratedArticle, PipelineError>;
}

/// Content generator backed by the OpenAI chat completions API
pub struct OpenAiGenerator {
    http_client: reqwest::Client,
    api_key: String,
    chat_url: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: String) -> Result<Self, PipelineError> {
        Self::with_chat_url(api_key, OPENAI_CHAT_URL.to_string())
    }

    /// Construct against a non-default endpoint. Used by tests.
    pub fn with_chat_url(api_key: String, chat_url: String) -> Result<Self, PipelineError> {
        if api_key.is_empty() {
            return Err(PipelineError::Generation(
                "OpenAI API key is missing".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                PipelineError::Generation(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            api_key,
            chat_url,
        })
    }
}

/// Build the fixed instruction sent to the model
fn build_prompt(transcript: &str) -> String {
    format!("{}{}", PROMPT_PREFIX, transcript)
}

/// Pull the first choice's content out of a chat response
fn extract_content(response: ChatResponse) -> Option<String> {
    let content = response.choices.into_iter().next()?.message.content?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[async_trait]
impl ContentGenerator for OpenAiGenerator {
    async fn generate(&self, transcript: &str) -> Result<GeneratedArticle, PipelineError> {
        tracing::info!(transcript_len = transcript.len(), "Generating blog content");

        let response = self
            .http_client
            .post(&self.chat_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": MODEL,
                "messages": [
                    {"role": "user", "content": build_prompt(transcript)}
                ],
                "temperature": TEMPERATURE,
            }))
            .send()
            .await
            .map_err(|e| PipelineError::Generation(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PipelineError::Generation(format!(
                "service rejected request: {} - {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Generation(format!("bad response body: {}", e)))?;

        let content = extract_content(chat_response).ok_or_else(|| {
            PipelineError::Generation("response contained no usable content".to_string())
        })?;

        Ok(GeneratedArticle { content })
    }
}

// OpenAI API response types
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}
