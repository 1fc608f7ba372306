//! Transcription adapters

pub mod assemblyai;

pub use assemblyai::AssemblyAiTranscriber;
