//! Transcription port interface

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

/// Transcription errors, one per failed phase of the remote workflow
#[derive(Debug, Clone, Error)]
pub enum TranscriptionError {
    #[error("Failed to read audio file: {0}")]
    ReadFailed(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Job submission failed: {0}")]
    Submission(String),

    #[error("Transcription failed: {0}")]
    Remote(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Gave up waiting for transcript after {attempts} polls")]
    TimedOut { attempts: u32 },
}

/// Port for turning a local audio file into a transcript.
///
/// One invocation drives one file end-to-end; invocations are independent
/// and may run concurrently for different notes.
#[async_trait]
pub trait NoteTranscriber: Send + Sync {
    /// Transcribe the audio asset at `path`.
    ///
    /// # Returns
    /// The transcript text or the first phase failure. No partial state
    /// survives a failure; retrying starts the workflow from scratch.
    async fn transcribe(&self, path: &Path) -> Result<String, TranscriptionError>;
}
