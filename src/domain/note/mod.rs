//! Voice note entity

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a transcription preview line
const PREVIEW_LEN: usize = 60;

/// Opaque note identifier.
///
/// Generated from the creation instant's unix-millisecond timestamp, which
/// also makes it a usable newest-first sort key and matches the recording
/// file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate an identifier for the given creation instant
    pub fn from_timestamp(timestamp: DateTime<Utc>) -> Self {
        Self(timestamp.timestamp_millis().to_string())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NoteId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A recorded voice note.
///
/// Created the instant a recording stops successfully. `path` and
/// `timestamp` are immutable after creation; `transcription` is absent
/// until a transcription job completes and, once set, is never
/// overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceNote {
    pub id: NoteId,
    pub path: PathBuf,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
}

impl VoiceNote {
    /// Create a note for a freshly recorded audio asset
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::at(path, Utc::now())
    }

    /// Create a note with an explicit creation instant
    pub fn at(path: impl Into<PathBuf>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: NoteId::from_timestamp(timestamp),
            path: path.into(),
            timestamp,
            transcription: None,
        }
    }

    /// Path of the recorded audio asset
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a transcript has been stored for this note
    pub fn is_transcribed(&self) -> bool {
        self.transcription.is_some()
    }

    /// Whether the note was recorded within the last minute
    pub fn is_new(&self) -> bool {
        Utc::now().signed_duration_since(self.timestamp) < chrono::Duration::seconds(60)
    }

    /// Single-line transcription preview for list rendering
    pub fn transcription_preview(&self) -> Option<String> {
        let text = self.transcription.as_deref()?;
        let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if flat.chars().count() <= PREVIEW_LEN {
            Some(flat)
        } else {
            let truncated: String = flat.chars().take(PREVIEW_LEN).collect();
            Some(format!("{}...", truncated))
        }
    }
}
