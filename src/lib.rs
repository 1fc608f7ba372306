//! VoiceNotes - voice note recorder with async speech-to-text transcription
//!
//! This crate provides the core functionality for recording short voice notes,
//! persisting them locally, playing them back, and transcribing them through a
//! remote speech-to-text service.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Core entities, state machines, and errors
//! - **Application**: Services and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, rodio, AssemblyAI, JSON storage)
//! - **CLI**: Command-line interface and argument parsing

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
