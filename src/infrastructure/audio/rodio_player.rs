//! Audio playback using rodio
//!
//! Each playback runs on a dedicated thread that owns the non-Send
//! output stream; the thread also drives the position callback until the
//! stream is stopped or runs out.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use log::warn;
use rodio::{Decoder, OutputStream, Sink, Source};
use tokio::sync::oneshot;

use crate::application::ports::{AudioError, PlaybackProgress, PositionCallback};

/// Cadence of playback position reports
const POSITION_TICK_MS: u64 = 200;

struct ActiveStream {
    sink: Arc<Sink>,
    stopped: Arc<AtomicBool>,
}

/// Playback adapter over a single rodio sink
pub struct RodioPlayer {
    active: StdMutex<Option<ActiveStream>>,
}

impl RodioPlayer {
    pub fn new() -> Self {
        Self {
            active: StdMutex::new(None),
        }
    }

    fn lock_active(&self) -> std::sync::MutexGuard<'_, Option<ActiveStream>> {
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start playing the asset at `path`, reporting positions to
    /// `on_position`. Any previous stream is stopped first.
    pub async fn start(&self, path: &Path, on_position: PositionCallback) -> Result<(), AudioError> {
        if !path.exists() {
            return Err(AudioError::MissingFile(path.display().to_string()));
        }

        // Defensive teardown; the session controller normally does this
        if let Err(e) = self.stop() {
            warn!("Failed to stop previous playback stream: {}", e);
        }

        let stopped = Arc::new(AtomicBool::new(false));
        let thread_stopped = Arc::clone(&stopped);
        let source_path = path.to_path_buf();
        let (ready_tx, ready_rx) = oneshot::channel::<Result<Arc<Sink>, AudioError>>();

        std::thread::spawn(move || {
            let setup = || -> Result<(OutputStream, Arc<Sink>, Option<u64>), AudioError> {
                let (stream, handle) = OutputStream::try_default()
                    .map_err(|e| AudioError::PlaybackFailed(e.to_string()))?;
                let sink =
                    Sink::try_new(&handle).map_err(|e| AudioError::PlaybackFailed(e.to_string()))?;

                let file = File::open(&source_path)
                    .map_err(|e| AudioError::PlaybackFailed(e.to_string()))?;
                let source = Decoder::new(BufReader::new(file))
                    .map_err(|e| AudioError::PlaybackFailed(e.to_string()))?;

                let duration_ms = source.total_duration().map(|d| d.as_millis() as u64);
                sink.append(source);

                Ok((stream, Arc::new(sink), duration_ms))
            };

            let (stream, sink, duration_ms) = match setup() {
                Ok(parts) => parts,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            let _ = ready_tx.send(Ok(Arc::clone(&sink)));

            loop {
                if thread_stopped.load(Ordering::SeqCst) {
                    // Manual stop: end updates without a terminal event
                    break;
                }

                if sink.empty() {
                    let duration = duration_ms.unwrap_or(0);
                    on_position(PlaybackProgress {
                        position_ms: duration,
                        duration_ms: duration,
                        finished: true,
                    });
                    break;
                }

                on_position(PlaybackProgress {
                    position_ms: sink.get_pos().as_millis() as u64,
                    duration_ms: duration_ms.unwrap_or(0),
                    finished: false,
                });

                std::thread::sleep(std::time::Duration::from_millis(POSITION_TICK_MS));
            }

            // The output stream must outlive the sink it feeds
            drop(stream);
        });

        match ready_rx.await {
            Ok(Ok(sink)) => {
                *self.lock_active() = Some(ActiveStream { sink, stopped });
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(AudioError::PlaybackFailed(
                "Playback thread terminated".to_string(),
            )),
        }
    }

    /// Pause the active stream
    pub fn pause(&self) -> Result<(), AudioError> {
        let active = self.lock_active();
        let stream = active
            .as_ref()
            .ok_or_else(|| AudioError::PlaybackFailed("No active stream".to_string()))?;
        stream.sink.pause();
        Ok(())
    }

    /// Resume a paused stream
    pub fn resume(&self) -> Result<(), AudioError> {
        let active = self.lock_active();
        let stream = active
            .as_ref()
            .ok_or_else(|| AudioError::PlaybackFailed("No active stream".to_string()))?;
        stream.sink.play();
        Ok(())
    }

    /// Stop and discard the active stream, if any
    pub fn stop(&self) -> Result<(), AudioError> {
        if let Some(stream) = self.lock_active().take() {
            stream.stopped.store(true, Ordering::SeqCst);
            stream.sink.stop();
        }
        Ok(())
    }
}

impl Default for RodioPlayer {
    fn default() -> Self {
        Self::new()
    }
}
