//! Audio session state machine

use std::fmt;
use thiserror::Error;

/// Audio session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AudioSessionState {
    #[default]
    Idle,
    Recording,
    Playing,
    Paused,
}

impl AudioSessionState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }
}

impl fmt::Display for AudioSessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: AudioSessionState,
    pub action: String,
}

/// Exclusive audio session entity.
/// Only one mode (recording XOR playing) may be active at a time.
///
/// State machine:
///   IDLE -> RECORDING (start_recording)
///   RECORDING -> IDLE (stop_recording)
///   IDLE -> PLAYING (start_playback)
///   PLAYING -> PAUSED (pause_playback)
///   PAUSED -> PLAYING (resume_playback)
///   PLAYING | PAUSED -> IDLE (stop_playback)
///   any -> IDLE (finish_playback, reset)
#[derive(Debug, Default)]
pub struct AudioSession {
    state: AudioSessionState,
}

impl AudioSession {
    /// Create a new session in idle state
    pub fn new() -> Self {
        Self {
            state: AudioSessionState::Idle,
        }
    }

    /// Get the current state
    pub fn state(&self) -> AudioSessionState {
        self.state
    }

    /// Check if currently idle
    pub fn is_idle(&self) -> bool {
        self.state == AudioSessionState::Idle
    }

    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        self.state == AudioSessionState::Recording
    }

    /// Check if a playback stream exists (playing or paused)
    pub fn has_playback(&self) -> bool {
        matches!(
            self.state,
            AudioSessionState::Playing | AudioSessionState::Paused
        )
    }

    fn invalid(&self, action: &str) -> InvalidStateTransition {
        InvalidStateTransition {
            current_state: self.state,
            action: action.to_string(),
        }
    }

    /// Transition from IDLE to RECORDING
    pub fn start_recording(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != AudioSessionState::Idle {
            return Err(self.invalid("start recording"));
        }
        self.state = AudioSessionState::Recording;
        Ok(())
    }

    /// Transition from RECORDING to IDLE
    pub fn stop_recording(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != AudioSessionState::Recording {
            return Err(self.invalid("stop recording"));
        }
        self.state = AudioSessionState::Idle;
        Ok(())
    }

    /// Transition from IDLE to PLAYING
    pub fn start_playback(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != AudioSessionState::Idle {
            return Err(self.invalid("start playback"));
        }
        self.state = AudioSessionState::Playing;
        Ok(())
    }

    /// Transition from PLAYING to PAUSED
    pub fn pause_playback(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != AudioSessionState::Playing {
            return Err(self.invalid("pause playback"));
        }
        self.state = AudioSessionState::Paused;
        Ok(())
    }

    /// Transition from PAUSED to PLAYING
    pub fn resume_playback(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != AudioSessionState::Paused {
            return Err(self.invalid("resume playback"));
        }
        self.state = AudioSessionState::Playing;
        Ok(())
    }

    /// Transition from PLAYING or PAUSED to IDLE
    pub fn stop_playback(&mut self) -> Result<(), InvalidStateTransition> {
        if !self.has_playback() {
            return Err(self.invalid("stop playback"));
        }
        self.state = AudioSessionState::Idle;
        Ok(())
    }

    /// Unconditional transition to IDLE when the stream completes on its own
    pub fn finish_playback(&mut self) {
        self.state = AudioSessionState::Idle;
    }

    /// Unconditional transition to IDLE for failure recovery
    pub fn reset(&mut self) {
        self.state = AudioSessionState::Idle;
    }
}
