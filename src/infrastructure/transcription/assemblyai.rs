//! AssemblyAI transcriber adapter
//!
//! Drives the three-phase remote workflow for one audio file:
//! upload the raw bytes, submit a transcription job for the returned
//! upload handle, then poll the job until it reaches a terminal status.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::application::ports::{NoteTranscriber, TranscriptionError};
use crate::domain::config::app_config::{DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_SPEECH_MODEL};

/// AssemblyAI API base URL
const API_BASE_URL: &str = "https://api.assemblyai.com/v2";

// Request types for the AssemblyAI API

#[derive(Debug, Serialize)]
struct TranscriptRequest<'a> {
    audio_url: &'a str,
    speech_model: &'a str,
}

// Response types for the AssemblyAI API

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TranscriptStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

#[derive(Debug, Deserialize)]
struct TranscriptStatusResponse {
    status: TranscriptStatus,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// AssemblyAI transcription job client
pub struct AssemblyAiTranscriber {
    api_key: String,
    base_url: String,
    speech_model: String,
    poll_interval: Duration,
    max_poll_attempts: Option<u32>,
    client: reqwest::Client,
}

impl AssemblyAiTranscriber {
    /// Create a new client with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: API_BASE_URL.to_string(),
            speech_model: DEFAULT_SPEECH_MODEL.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_poll_attempts: Some(DEFAULT_MAX_POLL_ATTEMPTS),
            client: reqwest::Client::new(),
        }
    }

    /// Override the API base URL (also used by tests against a mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the speech model submitted with jobs
    pub fn with_speech_model(mut self, model: impl Into<String>) -> Self {
        self.speech_model = model.into();
        self
    }

    /// Override the polling cadence. `max_attempts` of `None` polls
    /// without bound.
    pub fn with_polling(mut self, interval: Duration, max_attempts: Option<u32>) -> Self {
        self.poll_interval = interval;
        self.max_poll_attempts = max_attempts;
        self
    }

    fn upload_endpoint(&self) -> String {
        format!("{}/upload", self.base_url)
    }

    fn transcript_endpoint(&self) -> String {
        format!("{}/transcript", self.base_url)
    }

    fn polling_endpoint(&self, job_id: &str) -> String {
        format!("{}/transcript/{}", self.base_url, job_id)
    }

    /// Phase 1: send the raw audio bytes, returning the upload handle
    async fn upload(&self, audio: Vec<u8>) -> Result<String, TranscriptionError> {
        let response = self
            .client
            .post(self.upload_endpoint())
            .header(AUTHORIZATION, &self.api_key)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(audio)
            .send()
            .await
            .map_err(|e| TranscriptionError::Upload(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(TranscriptionError::InvalidApiKey);
        }
        if !status.is_success() {
            return Err(TranscriptionError::Upload(format!("HTTP {}", status)));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::Upload(e.to_string()))?;
        Ok(body.upload_url)
    }

    /// Phase 2: submit a job for the upload handle, returning the job id
    async fn submit(&self, audio_url: &str) -> Result<String, TranscriptionError> {
        let body = TranscriptRequest {
            audio_url,
            speech_model: &self.speech_model,
        };

        let response = self
            .client
            .post(self.transcript_endpoint())
            .header(AUTHORIZATION, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TranscriptionError::Submission(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(TranscriptionError::InvalidApiKey);
        }
        if !status.is_success() {
            return Err(TranscriptionError::Submission(format!("HTTP {}", status)));
        }

        let body: SubmitResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::Submission(e.to_string()))?;
        Ok(body.id)
    }

    /// Phase 3: poll the job on a fixed interval until terminal
    async fn poll(&self, job_id: &str) -> Result<String, TranscriptionError> {
        let endpoint = self.polling_endpoint(job_id);
        let mut attempts: u32 = 0;

        loop {
            let response = self
                .client
                .get(&endpoint)
                .header(AUTHORIZATION, &self.api_key)
                .send()
                .await
                .map_err(|e| TranscriptionError::Remote(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(TranscriptionError::Remote(format!("HTTP {}", status)));
            }

            let body: TranscriptStatusResponse = response
                .json()
                .await
                .map_err(|e| TranscriptionError::Remote(e.to_string()))?;

            match body.status {
                TranscriptStatus::Completed => {
                    return Ok(body.text.unwrap_or_default());
                }
                TranscriptStatus::Error => {
                    return Err(TranscriptionError::Remote(
                        body.error.unwrap_or_else(|| "unknown error".to_string()),
                    ));
                }
                TranscriptStatus::Queued | TranscriptStatus::Processing => {
                    attempts += 1;
                    if let Some(max) = self.max_poll_attempts {
                        if attempts >= max {
                            return Err(TranscriptionError::TimedOut { attempts });
                        }
                    }
                    debug!("Job {} still {:?}, polling again", job_id, body.status);
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }
}

#[async_trait]
impl NoteTranscriber for AssemblyAiTranscriber {
    async fn transcribe(&self, path: &Path) -> Result<String, TranscriptionError> {
        let audio = tokio::fs::read(path)
            .await
            .map_err(|e| TranscriptionError::ReadFailed(e.to_string()))?;

        let upload_url = self.upload(audio).await?;
        debug!("Uploaded {} as {}", path.display(), upload_url);

        let job_id = self.submit(&upload_url).await?;
        debug!("Submitted job {}", job_id);

        self.poll(&job_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_follow_base_url() {
        let client = AssemblyAiTranscriber::new("test-key").with_base_url("http://localhost:9999");

        assert_eq!(client.upload_endpoint(), "http://localhost:9999/upload");
        assert_eq!(client.transcript_endpoint(), "http://localhost:9999/transcript");
        assert_eq!(
            client.polling_endpoint("j1"),
            "http://localhost:9999/transcript/j1"
        );
    }

    #[test]
    fn transcript_request_shape() {
        let request = TranscriptRequest {
            audio_url: "https://cdn.example/u1",
            speech_model: "slam-1",
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["audio_url"], "https://cdn.example/u1");
        assert_eq!(json["speech_model"], "slam-1");
    }

    #[test]
    fn status_deserializes_lowercase() {
        let body: TranscriptStatusResponse =
            serde_json::from_str(r#"{"status":"processing"}"#).unwrap();
        assert_eq!(body.status, TranscriptStatus::Processing);
        assert_eq!(body.text, None);

        let body: TranscriptStatusResponse =
            serde_json::from_str(r#"{"status":"completed","text":"hello world"}"#).unwrap();
        assert_eq!(body.status, TranscriptStatus::Completed);
        assert_eq!(body.text.as_deref(), Some("hello world"));

        let body: TranscriptStatusResponse =
            serde_json::from_str(r#"{"status":"error","error":"bad audio"}"#).unwrap();
        assert_eq!(body.status, TranscriptStatus::Error);
        assert_eq!(body.error.as_deref(), Some("bad audio"));
    }

    #[test]
    fn default_polling_matches_config_defaults() {
        let client = AssemblyAiTranscriber::new("key");
        assert_eq!(client.poll_interval, Duration::from_secs(3));
        assert_eq!(client.max_poll_attempts, Some(DEFAULT_MAX_POLL_ATTEMPTS));

        let unbounded = AssemblyAiTranscriber::new("key")
            .with_polling(Duration::from_millis(10), None);
        assert_eq!(unbounded.max_poll_attempts, None);
    }
}
