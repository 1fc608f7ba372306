//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod audio;
pub mod blob;
pub mod config;
pub mod permissions;
pub mod transcriber;

// Re-export common types
pub use audio::{AudioError, AudioTransport, PlaybackProgress, PositionCallback};
pub use blob::{BlobStore, StorageError};
pub use config::ConfigStore;
pub use permissions::{PermissionProbe, PermissionStatus};
pub use transcriber::{NoteTranscriber, TranscriptionError};
