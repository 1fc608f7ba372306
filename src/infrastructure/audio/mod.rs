//! Audio transport adapters

pub mod cpal_recorder;
pub mod probe;
pub mod rodio_player;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::application::ports::{AudioError, AudioTransport, PositionCallback};

pub use cpal_recorder::CpalRecorder;
pub use probe::CpalPermissionProbe;
pub use rodio_player::RodioPlayer;

/// The single hardware-backed audio transport: cpal capture plus rodio
/// playback behind one port.
pub struct DeviceAudioTransport {
    recorder: CpalRecorder,
    player: RodioPlayer,
}

impl DeviceAudioTransport {
    pub fn new() -> Self {
        Self {
            recorder: CpalRecorder::new(),
            player: RodioPlayer::new(),
        }
    }
}

impl Default for DeviceAudioTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioTransport for DeviceAudioTransport {
    async fn start_recorder(&self, path: &Path) -> Result<(), AudioError> {
        self.recorder.start(path).await
    }

    async fn stop_recorder(&self) -> Result<PathBuf, AudioError> {
        self.recorder.stop().await
    }

    async fn start_player(
        &self,
        path: &Path,
        on_position: PositionCallback,
    ) -> Result<(), AudioError> {
        self.player.start(path, on_position).await
    }

    async fn pause_player(&self) -> Result<(), AudioError> {
        self.player.pause()
    }

    async fn resume_player(&self) -> Result<(), AudioError> {
        self.player.resume()
    }

    async fn stop_player(&self) -> Result<(), AudioError> {
        self.player.stop()
    }
}
