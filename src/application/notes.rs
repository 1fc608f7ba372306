//! Note lifecycle coordinator
//!
//! Glues the session controller, note store, and transcription client
//! into the user-facing operations.

use std::path::PathBuf;

use log::{debug, warn};
use thiserror::Error;

use crate::domain::note::{NoteId, VoiceNote};

use super::ports::{AudioTransport, BlobStore, NoteTranscriber, PositionCallback, TranscriptionError};
use super::session::{AudioSessionController, SessionError};
use super::store::NoteStore;

/// Text shown in place of a transcript when the remote workflow fails.
/// Never persisted; the stored transcription stays empty so a later
/// retry goes back to the service.
pub const TRANSCRIPTION_FAILED_SENTINEL: &str = "Transcription failed";

/// Errors from coordinator operations
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("No note with id {0}")]
    NoteNotFound(NoteId),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Result of a transcription request for a note
#[derive(Debug, Clone)]
pub enum TranscribeOutcome {
    /// The remote workflow ran and the transcript was stored
    Transcribed(String),
    /// The note already had a transcript; the workflow was not invoked
    AlreadyTranscribed(String),
    /// The workflow failed; nothing was stored
    Failed(TranscriptionError),
}

impl TranscribeOutcome {
    /// Text to present for this outcome
    pub fn display_text(&self) -> &str {
        match self {
            Self::Transcribed(text) | Self::AlreadyTranscribed(text) => text,
            Self::Failed(_) => TRANSCRIPTION_FAILED_SENTINEL,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Top-level orchestration over the three core components.
pub struct NoteCoordinator<A, T, B>
where
    A: AudioTransport,
    T: NoteTranscriber,
    B: BlobStore,
{
    audio: AudioSessionController<A>,
    transcriber: T,
    store: NoteStore<B>,
}

impl<A, T, B> NoteCoordinator<A, T, B>
where
    A: AudioTransport,
    T: NoteTranscriber,
    B: BlobStore,
{
    /// Create a coordinator over the given port implementations
    pub fn new(transport: A, transcriber: T, blob: B, notes_dir: impl Into<PathBuf>) -> Self {
        Self {
            audio: AudioSessionController::new(transport, notes_dir),
            transcriber,
            store: NoteStore::new(blob),
        }
    }

    /// Load persisted notes at startup
    pub async fn init(&self) -> Vec<VoiceNote> {
        self.store.load().await
    }

    /// The underlying session controller
    pub fn audio(&self) -> &AudioSessionController<A> {
        &self.audio
    }

    /// The underlying note store
    pub fn store(&self) -> &NoteStore<B> {
        &self.store
    }

    /// Current snapshot of the note collection
    pub async fn notes(&self) -> Vec<VoiceNote> {
        self.store.snapshot().await
    }

    /// Start recording a new note
    pub async fn start_recording(&self) -> Result<PathBuf, CoordinatorError> {
        Ok(self.audio.start_recording().await?)
    }

    /// Stop the active recording and persist a new note for it.
    ///
    /// A stop failure produces no note and leaves the session idle.
    pub async fn finish_recording(&self) -> Result<VoiceNote, CoordinatorError> {
        let path = self.audio.stop_recording().await?;
        let note = VoiceNote::new(path);
        debug!("Created note {} for {}", note.id, note.path.display());
        self.store.append(note.clone()).await;
        Ok(note)
    }

    /// Delete the note with the given id, then reload the store as a
    /// consistency safeguard against partial write failures.
    pub async fn delete_note(&self, id: &NoteId) -> Result<(), CoordinatorError> {
        let removed = self.store.remove(id).await;
        self.store.load().await;
        if removed {
            Ok(())
        } else {
            Err(CoordinatorError::NoteNotFound(id.clone()))
        }
    }

    /// Run the transcription workflow for the note with the given id.
    ///
    /// A no-op when the note already carries a transcript. On failure
    /// nothing is persisted, so a later call retries from scratch. The
    /// job is not cancellable; if the note is deleted while it runs, the
    /// eventual result is silently discarded by the store.
    pub async fn transcribe(&self, id: &NoteId) -> Result<TranscribeOutcome, CoordinatorError> {
        let note = self
            .store
            .get(id)
            .await
            .ok_or_else(|| CoordinatorError::NoteNotFound(id.clone()))?;

        if let Some(text) = note.transcription {
            debug!("Note {} already transcribed, skipping job", id);
            return Ok(TranscribeOutcome::AlreadyTranscribed(text));
        }

        match self.transcriber.transcribe(&note.path).await {
            Ok(text) => {
                self.store.set_transcription(id, &text).await;
                Ok(TranscribeOutcome::Transcribed(text))
            }
            Err(e) => {
                warn!("Transcription of note {} failed: {}", id, e);
                Ok(TranscribeOutcome::Failed(e))
            }
        }
    }

    /// Play back the note with the given id
    pub async fn play(
        &self,
        id: &NoteId,
        on_position: PositionCallback,
    ) -> Result<(), CoordinatorError> {
        let note = self
            .store
            .get(id)
            .await
            .ok_or_else(|| CoordinatorError::NoteNotFound(id.clone()))?;
        self.audio.start_playback(&note.path, on_position).await?;
        Ok(())
    }

    /// Pause the active playback
    pub async fn pause(&self) -> Result<(), CoordinatorError> {
        Ok(self.audio.pause().await?)
    }

    /// Resume a paused playback
    pub async fn resume(&self) -> Result<(), CoordinatorError> {
        Ok(self.audio.resume().await?)
    }

    /// Stop the active playback
    pub async fn stop_playback(&self) -> Result<(), CoordinatorError> {
        Ok(self.audio.stop_playback().await?)
    }
}
