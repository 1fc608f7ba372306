//! Audio session controller service
//!
//! Single exclusive wrapper around the one underlying recorder/player
//! resource. All transport access is routed through the state machine so
//! that only one stream (recording XOR playing) is ever active.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex};

use chrono::Utc;
use log::{debug, warn};
use thiserror::Error;
use tokio::fs;

use crate::domain::audio::{AudioSession, AudioSessionState, InvalidStateTransition};

use super::ports::{AudioError, AudioTransport, PlaybackProgress, PositionCallback};

/// Duration reported with the terminal playback event. Non-zero so that
/// progress-ratio math downstream cannot divide by zero.
pub const COMPLETED_DURATION_PLACEHOLDER_MS: u64 = 1;

/// Errors from the session controller
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),

    #[error(transparent)]
    Audio(#[from] AudioError),
}

/// Exclusive owner of the hardware audio session.
///
/// Any failure from the underlying transport resets the controller to
/// idle; it is never left in an intermediate state.
pub struct AudioSessionController<A: AudioTransport> {
    transport: A,
    // std mutex: the transport's position callback is synchronous and has
    // to drive the terminal transition. Guards are never held across await.
    session: Arc<StdMutex<AudioSession>>,
    notes_dir: PathBuf,
}

impl<A: AudioTransport> AudioSessionController<A> {
    /// Create a controller recording into `notes_dir`
    pub fn new(transport: A, notes_dir: impl Into<PathBuf>) -> Self {
        Self {
            transport,
            session: Arc::new(StdMutex::new(AudioSession::new())),
            notes_dir: notes_dir.into(),
        }
    }

    /// Current session state
    pub fn state(&self) -> AudioSessionState {
        self.lock().state()
    }

    /// Directory new recordings are written into
    pub fn notes_dir(&self) -> &Path {
        &self.notes_dir
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AudioSession> {
        // The session mutex cannot be poisoned: no panics occur while held.
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Pick a collision-resistant destination for a new recording
    fn next_recording_path(&self) -> PathBuf {
        self.notes_dir
            .join(format!("note_{}.wav", Utc::now().timestamp_millis()))
    }

    /// Start a new recording.
    ///
    /// Rejected while any stream is active; a transport failure resets
    /// the session to idle and no file is produced.
    pub async fn start_recording(&self) -> Result<PathBuf, SessionError> {
        self.lock().start_recording()?;

        let path = self.next_recording_path();
        if let Err(e) = fs::create_dir_all(&self.notes_dir).await {
            self.lock().reset();
            return Err(AudioError::RecorderStartFailed(e.to_string()).into());
        }

        if let Err(e) = self.transport.start_recorder(&path).await {
            self.lock().reset();
            return Err(e.into());
        }

        debug!("Recording started at {}", path.display());
        Ok(path)
    }

    /// Stop the active recording and return the finalized file path.
    ///
    /// The session transitions to idle before the transport stop, so an
    /// underlying stop failure still leaves the controller idle; the
    /// caller must not create a note in that case.
    pub async fn stop_recording(&self) -> Result<PathBuf, SessionError> {
        self.lock().stop_recording()?;

        let path = self.transport.stop_recorder().await?;
        debug!("Recording finalized at {}", path.display());
        Ok(path)
    }

    /// Start playback of the asset at `path`.
    ///
    /// Any active stream is torn down first: a previous playback is
    /// stopped, an in-flight recording is stopped and its output
    /// discarded. Only one stream exists at a time.
    pub async fn start_playback(
        &self,
        path: &Path,
        on_position: PositionCallback,
    ) -> Result<(), SessionError> {
        let previous = self.lock().state();
        match previous {
            AudioSessionState::Playing | AudioSessionState::Paused => {
                if let Err(e) = self.transport.stop_player().await {
                    warn!("Failed to stop previous playback: {}", e);
                }
                self.lock().reset();
            }
            AudioSessionState::Recording => {
                // Implicit teardown; the interrupted recording produces no note.
                match self.transport.stop_recorder().await {
                    Ok(discarded) => debug!("Discarding interrupted recording {}", discarded.display()),
                    Err(e) => warn!("Failed to stop recorder before playback: {}", e),
                }
                self.lock().reset();
            }
            AudioSessionState::Idle => {}
        }

        self.lock().start_playback()?;

        let session = Arc::clone(&self.session);
        let wrapped: PositionCallback = Arc::new(move |progress: PlaybackProgress| {
            if progress.finished {
                if let Ok(mut s) = session.lock() {
                    s.finish_playback();
                }
                on_position(PlaybackProgress {
                    position_ms: 0,
                    duration_ms: COMPLETED_DURATION_PLACEHOLDER_MS,
                    finished: true,
                });
            } else {
                on_position(progress);
            }
        });

        if let Err(e) = self.transport.start_player(path, wrapped).await {
            self.lock().reset();
            return Err(e.into());
        }
        Ok(())
    }

    /// Pause the active playback stream
    pub async fn pause(&self) -> Result<(), SessionError> {
        self.lock().pause_playback()?;

        if let Err(e) = self.transport.pause_player().await {
            self.abort_playback().await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Resume a paused playback stream
    pub async fn resume(&self) -> Result<(), SessionError> {
        self.lock().resume_playback()?;

        if let Err(e) = self.transport.resume_player().await {
            self.abort_playback().await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Stop the active playback stream
    pub async fn stop_playback(&self) -> Result<(), SessionError> {
        self.lock().stop_playback()?;

        self.transport.stop_player().await?;
        Ok(())
    }

    /// Tear down a failed playback stream, best effort
    async fn abort_playback(&self) {
        if let Err(e) = self.transport.stop_player().await {
            warn!("Failed to tear down playback stream: {}", e);
        }
        self.lock().reset();
    }
}
