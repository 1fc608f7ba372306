//! Microphone recorder using cpal
//!
//! Captures mono 16-bit PCM at the device rate and finalizes it into a
//! WAV container when the recording stops.
//!
//! The stream is owned by a dedicated thread because cpal::Stream is not
//! Send; the async side communicates through atomics and a readiness
//! channel.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use log::{debug, warn};
use tokio::sync::oneshot;

use crate::application::ports::AudioError;

/// How often the capture thread checks for the stop flag
const STOP_POLL_MS: u64 = 50;

/// Microphone recorder buffering samples until stop
pub struct CpalRecorder {
    /// Recorded audio samples (mono, i16, at device sample rate)
    audio_buffer: Arc<StdMutex<Vec<i16>>>,
    /// Device sample rate of the samples currently buffered
    device_sample_rate: Arc<AtomicU32>,
    /// Recording state, shared with the capture thread
    is_recording: Arc<AtomicBool>,
    /// Destination of the in-flight recording
    destination: StdMutex<Option<PathBuf>>,
}

impl CpalRecorder {
    /// Create a new cpal-based recorder
    pub fn new() -> Self {
        Self {
            audio_buffer: Arc::new(StdMutex::new(Vec::new())),
            device_sample_rate: Arc::new(AtomicU32::new(0)),
            is_recording: Arc::new(AtomicBool::new(false)),
            destination: StdMutex::new(None),
        }
    }

    /// Get the default input device
    fn get_input_device() -> Result<cpal::Device, AudioError> {
        let host = cpal::default_host();
        host.default_input_device().ok_or(AudioError::NoAudioDevice)
    }

    /// Get the default input configuration
    fn get_input_config(device: &cpal::Device) -> Result<(StreamConfig, SampleFormat), AudioError> {
        let supported = device
            .default_input_config()
            .map_err(|e| AudioError::RecorderStartFailed(format!("No input config: {}", e)))?;

        let sample_format = supported.sample_format();
        Ok((supported.into(), sample_format))
    }

    /// Mix interleaved frames down to mono
    fn mix_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
        if channels <= 1 {
            return samples.to_vec();
        }

        samples
            .chunks(channels as usize)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect()
    }

    /// Write buffered samples into a WAV container
    fn write_wav(path: &Path, samples: &[i16], sample_rate: u32) -> Result<(), AudioError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(path, spec)
            .map_err(|e| AudioError::RecorderStopFailed(e.to_string()))?;

        for &sample in samples {
            writer
                .write_sample(sample)
                .map_err(|e| AudioError::RecorderStopFailed(e.to_string()))?;
        }

        writer
            .finalize()
            .map_err(|e| AudioError::RecorderStopFailed(e.to_string()))
    }

    /// Start capturing into an internal buffer, to be finalized at `path`
    pub async fn start(&self, path: &Path) -> Result<(), AudioError> {
        if self.is_recording.swap(true, Ordering::SeqCst) {
            return Err(AudioError::RecorderStartFailed(
                "Recording already in progress".to_string(),
            ));
        }

        {
            let mut buffer = self.lock_buffer();
            buffer.clear();
        }
        *self.lock_destination() = Some(path.to_path_buf());

        let audio_buffer = Arc::clone(&self.audio_buffer);
        let device_sample_rate = Arc::clone(&self.device_sample_rate);
        let is_recording = Arc::clone(&self.is_recording);
        let (ready_tx, ready_rx) = oneshot::channel::<Result<(), AudioError>>();

        // The capture thread owns the non-Send stream for the whole take
        std::thread::spawn(move || {
            let setup = || -> Result<cpal::Stream, AudioError> {
                let device = CpalRecorder::get_input_device()?;
                let (config, sample_format) = CpalRecorder::get_input_config(&device)?;
                let channels = config.channels;
                device_sample_rate.store(config.sample_rate.0, Ordering::SeqCst);

                let stream = match sample_format {
                    SampleFormat::I16 => {
                        let buffer = Arc::clone(&audio_buffer);
                        let recording = Arc::clone(&is_recording);
                        device
                            .build_input_stream(
                                &config,
                                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                                    if recording.load(Ordering::SeqCst) {
                                        let mono = CpalRecorder::mix_to_mono(data, channels);
                                        if let Ok(mut buffer) = buffer.lock() {
                                            buffer.extend_from_slice(&mono);
                                        }
                                    }
                                },
                                |err| warn!("Audio input stream error: {}", err),
                                None,
                            )
                            .map_err(|e| AudioError::RecorderStartFailed(e.to_string()))?
                    }
                    SampleFormat::F32 => {
                        let buffer = Arc::clone(&audio_buffer);
                        let recording = Arc::clone(&is_recording);
                        device
                            .build_input_stream(
                                &config,
                                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                                    if recording.load(Ordering::SeqCst) {
                                        let i16_data: Vec<i16> =
                                            data.iter().map(|&s| (s * 32767.0) as i16).collect();
                                        let mono = CpalRecorder::mix_to_mono(&i16_data, channels);
                                        if let Ok(mut buffer) = buffer.lock() {
                                            buffer.extend_from_slice(&mono);
                                        }
                                    }
                                },
                                |err| warn!("Audio input stream error: {}", err),
                                None,
                            )
                            .map_err(|e| AudioError::RecorderStartFailed(e.to_string()))?
                    }
                    other => {
                        return Err(AudioError::RecorderStartFailed(format!(
                            "Unsupported sample format {:?}",
                            other
                        )))
                    }
                };

                stream
                    .play()
                    .map_err(|e| AudioError::RecorderStartFailed(e.to_string()))?;
                Ok(stream)
            };

            let stream = match setup() {
                Ok(stream) => {
                    let _ = ready_tx.send(Ok(()));
                    stream
                }
                Err(e) => {
                    is_recording.store(false, Ordering::SeqCst);
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            while is_recording.load(Ordering::SeqCst) {
                std::thread::sleep(std::time::Duration::from_millis(STOP_POLL_MS));
            }

            drop(stream);
        });

        match ready_rx.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                self.is_recording.store(false, Ordering::SeqCst);
                *self.lock_destination() = None;
                Err(e)
            }
            Err(_) => {
                self.is_recording.store(false, Ordering::SeqCst);
                *self.lock_destination() = None;
                Err(AudioError::RecorderStartFailed(
                    "Capture thread terminated".to_string(),
                ))
            }
        }
    }

    /// Stop capturing and finalize the WAV file
    pub async fn stop(&self) -> Result<PathBuf, AudioError> {
        if !self.is_recording.swap(false, Ordering::SeqCst) {
            return Err(AudioError::RecorderStopFailed(
                "No recording in progress".to_string(),
            ));
        }

        let path = self
            .lock_destination()
            .take()
            .ok_or_else(|| AudioError::RecorderStopFailed("No destination".to_string()))?;

        let samples = {
            let mut buffer = self.lock_buffer();
            std::mem::take(&mut *buffer)
        };
        let sample_rate = self.device_sample_rate.load(Ordering::SeqCst);

        if samples.is_empty() || sample_rate == 0 {
            return Err(AudioError::RecorderStopFailed(
                "No audio data captured".to_string(),
            ));
        }

        debug!(
            "Finalizing {} samples at {} Hz into {}",
            samples.len(),
            sample_rate,
            path.display()
        );

        let wav_path = path.clone();
        tokio::task::spawn_blocking(move || Self::write_wav(&wav_path, &samples, sample_rate))
            .await
            .map_err(|e| AudioError::RecorderStopFailed(format!("Finalize task error: {}", e)))??;

        Ok(path)
    }

    fn lock_buffer(&self) -> std::sync::MutexGuard<'_, Vec<i16>> {
        self.audio_buffer.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_destination(&self) -> std::sync::MutexGuard<'_, Option<PathBuf>> {
        self.destination.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for CpalRecorder {
    fn default() -> Self {
        Self::new()
    }
}
