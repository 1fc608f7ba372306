//! CLI argument definitions using Clap

use clap::{Parser, Subcommand};

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "api_key",
    "api_base_url",
    "speech_model",
    "notes_dir",
    "poll_interval_secs",
    "max_poll_attempts",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

/// VoiceNotes - record, play back, and transcribe voice notes
#[derive(Parser, Debug)]
#[command(name = "voice-notes")]
#[command(version)]
#[command(about = "Record, play back, and transcribe voice notes")]
#[command(long_about = None)]
pub struct Cli {
    /// Directory recordings are written into
    #[arg(long, value_name = "DIR", global = true)]
    pub notes_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a new note (press Enter or Ctrl-C to stop)
    Record,
    /// List all notes
    List,
    /// Play back a note (p pauses, r resumes, Enter stops)
    Play {
        /// Note id (see `list`)
        id: String,
    },
    /// Delete a note
    Delete {
        /// Note id (see `list`)
        id: String,
    },
    /// Transcribe a note through the speech-to-text service
    Transcribe {
        /// Note id (see `list`)
        id: String,

        /// Speech model to request
        #[arg(long, value_name = "MODEL")]
        speech_model: Option<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}
