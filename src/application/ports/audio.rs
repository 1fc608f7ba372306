//! Audio transport port interface

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Audio transport errors
#[derive(Debug, Clone, Error)]
pub enum AudioError {
    #[error("Microphone access denied")]
    PermissionDenied,

    #[error("No audio device available")]
    NoAudioDevice,

    #[error("Failed to start recorder: {0}")]
    RecorderStartFailed(String),

    #[error("Failed to stop recorder: {0}")]
    RecorderStopFailed(String),

    #[error("Audio file not found: {0}")]
    MissingFile(String),

    #[error("Playback failed: {0}")]
    PlaybackFailed(String),
}

/// Periodic playback position report.
/// `finished` marks the terminal event of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackProgress {
    pub position_ms: u64,
    pub duration_ms: u64,
    pub finished: bool,
}

/// Callback type for playback position updates
pub type PositionCallback = Arc<dyn Fn(PlaybackProgress) + Send + Sync>;

/// Port for the single underlying recorder/player resource.
///
/// Implementations own at most one recording stream and one playback
/// stream; callers are expected to serialize access through the session
/// controller.
#[async_trait]
pub trait AudioTransport: Send + Sync {
    /// Start recording to the given destination path.
    async fn start_recorder(&self, path: &Path) -> Result<(), AudioError>;

    /// Stop the active recording.
    ///
    /// # Returns
    /// The path of the finalized audio asset.
    async fn stop_recorder(&self) -> Result<PathBuf, AudioError>;

    /// Start playing the asset at `path`, delivering position updates to
    /// `on_position` until the stream stops or completes.
    async fn start_player(
        &self,
        path: &Path,
        on_position: PositionCallback,
    ) -> Result<(), AudioError>;

    /// Pause the active playback stream.
    async fn pause_player(&self) -> Result<(), AudioError>;

    /// Resume a paused playback stream.
    async fn resume_player(&self) -> Result<(), AudioError>;

    /// Stop the active playback stream. Stopping also ends position
    /// updates; no terminal event is delivered for a manual stop.
    async fn stop_player(&self) -> Result<(), AudioError>;
}
