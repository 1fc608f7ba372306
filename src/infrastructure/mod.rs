//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with external systems like cpal, rodio, the AssemblyAI
//! API, and the filesystem.

pub mod audio;
pub mod config;
pub mod storage;
pub mod transcription;

// Re-export adapters
pub use audio::{CpalPermissionProbe, CpalRecorder, DeviceAudioTransport, RodioPlayer};
pub use config::XdgConfigStore;
pub use storage::JsonFileStore;
pub use transcription::AssemblyAiTranscriber;
