use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::time::sleep;

use crate::resolver::AudioAsset;
use crate::PipelineError;

const ASSEMBLYAI_BASE_URL: &str = "https://api.assemblyai.com/v2";
const HTTP_TIMEOUT_SECS: u64 = 300;
const MAX_POLL_ATTEMPTS: u32 = 120;

/// Plain-text transcript of one audio asset
#[derive(Debug, Clone)]
pub struct Transcript {
    pub text: String,
}

/// Trait for turning a local audio file into a transcript
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Submit the asset to the speech-to-text service and block until a
    /// transcript is returned. A single failed attempt fails the request.
    async fn transcribe(&self, asset: &AudioAsset) -> Result<Transcript, PipelineError>;
}

/// Transcriber backed by the AssemblyAI v2 REST API
pub struct AssemblyAiTranscriber {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AssemblyAiTranscriber {
    pub fn new(api_key: String) -> Result<Self, PipelineError> {
        Self::with_base_url(api_key, ASSEMBLYAI_BASE_URL.to_string())
    }

    /// Construct against a non-default endpoint. Used by tests.
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, PipelineError> {
        if api_key.is_empty() {
            return Err(PipelineError::Transcription(
                "AssemblyAI API key is missing".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                PipelineError::Transcription(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            api_key,
            base_url,
        })
    }

    /// Upload local audio bytes, returning the service-side URL
    async fn upload_audio(&self, audio_data: Vec<u8>) -> Result<String, PipelineError> {
        let url = format!("{}/upload", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .header("authorization", &self.api_key)
            .body(audio_data)
            .send()
            .await
            .map_err(|e| PipelineError::Transcription(format!("upload failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PipelineError::Transcription(format!(
                "upload rejected: {} - {}",
                status, error_text
            )));
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Transcription(format!("bad upload response: {}", e)))?;

        Ok(upload.upload_url)
    }

    /// Create a transcript job for an uploaded audio URL
    async fn start_transcript(&self, audio_url: &str) -> Result<String, PipelineError> {
        let url = format!("{}/transcript", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .header("authorization", &self.api_key)
            .header("content-type", "application/json")
            .json(&json!({ "audio_url": audio_url }))
            .send()
            .await
            .map_err(|e| PipelineError::Transcription(format!("job creation failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PipelineError::Transcription(format!(
                "job creation rejected: {} - {}",
                status, error_text
            )));
        }

        let created: TranscriptCreated = response
            .json()
            .await
            .map_err(|e| PipelineError::Transcription(format!("bad job response: {}", e)))?;

        Ok(created.id)
    }

    /// Poll the transcript job until it completes or errors
    async fn poll_transcript(&self, transcript_id: &str) -> Result<TranscriptStatus, PipelineError> {
        let url = format!("{}/transcript/{}", self.base_url, transcript_id);

        let mut attempts = 0u32;

        loop {
            let response = self
                .http_client
                .get(&url)
                .header("authorization", &self.api_key)
                .send()
                .await
                .map_err(|e| PipelineError::Transcription(format!("status poll failed: {}", e)))?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(PipelineError::Transcription(format!(
                    "status poll rejected: {} - {}",
                    status, error_text
                )));
            }

            let transcript: TranscriptStatus = response
                .json()
                .await
                .map_err(|e| PipelineError::Transcription(format!("bad status response: {}", e)))?;

            match transcript.status.as_str() {
                "completed" => {
                    tracing::info!(transcript_id = %transcript_id, "Transcription completed");
                    return Ok(transcript);
                }
                "error" => {
                    return Err(PipelineError::Transcription(
                        transcript
                            .error
                            .unwrap_or_else(|| "unknown service error".to_string()),
                    ));
                }
                _ => {
                    // "queued" or "processing"
                    attempts += 1;
                    if attempts >= MAX_POLL_ATTEMPTS {
                        return Err(PipelineError::Transcription(format!(
                            "timed out after {} status checks",
                            attempts
                        )));
                    }

                    // Ramp from 1 second up to 5 seconds between checks
                    let delay_secs = attempts.min(5) as u64;
                    sleep(Duration::from_secs(delay_secs)).await;
                }
            }
        }
    }
}

#[async_trait]
impl Transcriber for AssemblyAiTranscriber {
    async fn transcribe(&self, asset: &AudioAsset) -> Result<Transcript, PipelineError> {
        let audio_data = fs_err::read(&asset.path)
            .map_err(|e| PipelineError::Transcription(format!("cannot read audio file: {}", e)))?;

        tracing::info!(
            path = %asset.path.display(),
            bytes = audio_data.len(),
            "Uploading audio for transcription"
        );

        let audio_url = self.upload_audio(audio_data).await?;
        let transcript_id = self.start_transcript(&audio_url).await?;

        tracing::debug!(transcript_id = %transcript_id, "Transcript job started, polling");

        let result = self.poll_transcript(&transcript_id).await?;

        Ok(Transcript {
            text: result.text.unwrap_or_default(),
        })
    }
}

// AssemblyAI API response types
#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptCreated {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptStatus {
    status: String,
    text: Option<String>,
    error: Option<String>,
}
