//! Note store service
//!
//! Owns the canonical in-memory note collection and mirrors it to the
//! durable blob after every mutation. The blob is never read
//! authoritatively except at startup load.

use log::warn;
use tokio::sync::Mutex;

use crate::domain::note::{NoteId, VoiceNote};

use super::ports::BlobStore;

/// Ordered note collection mirrored to a durable blob.
///
/// Mutations recompute the full collection and rewrite the whole blob; a
/// write failure is logged and leaves the in-memory state authoritative
/// (accepted transient divergence, reconciled on the next successful
/// write or restart).
pub struct NoteStore<B: BlobStore> {
    blob: B,
    notes: Mutex<Vec<VoiceNote>>,
}

impl<B: BlobStore> NoteStore<B> {
    /// Create an empty store over the given blob backend
    pub fn new(blob: B) -> Self {
        Self {
            blob,
            notes: Mutex::new(Vec::new()),
        }
    }

    /// Load the durable blob into the in-memory collection.
    ///
    /// A missing or structurally incompatible blob yields an empty
    /// collection; this never fails.
    pub async fn load(&self) -> Vec<VoiceNote> {
        let loaded = match self.blob.read().await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<VoiceNote>>(&raw) {
                Ok(notes) => notes,
                Err(e) => {
                    warn!("Discarding incompatible note storage blob: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Note storage unreadable, starting empty: {}", e);
                Vec::new()
            }
        };

        let mut notes = self.notes.lock().await;
        *notes = loaded;
        notes.clone()
    }

    /// Swap the in-memory collection and schedule a durable write of the
    /// same. Write failures are logged, not fatal.
    pub async fn replace_all(&self, new_notes: Vec<VoiceNote>) {
        let mut notes = self.notes.lock().await;
        *notes = new_notes;
        self.persist(&notes).await;
    }

    /// Append a note at the head of the collection (newest-first).
    /// A duplicate id is refused and logged.
    pub async fn append(&self, note: VoiceNote) {
        let mut notes = self.notes.lock().await;
        if notes.iter().any(|n| n.id == note.id) {
            warn!("Refusing to append duplicate note id {}", note.id);
            return;
        }
        notes.insert(0, note);
        self.persist(&notes).await;
    }

    /// Remove the note with the given id.
    ///
    /// # Returns
    /// Whether a note was removed.
    pub async fn remove(&self, id: &NoteId) -> bool {
        let mut notes = self.notes.lock().await;
        let before = notes.len();
        notes.retain(|n| &n.id != id);
        let removed = notes.len() != before;
        if removed {
            self.persist(&notes).await;
        }
        removed
    }

    /// Store a completed transcript for the note with the given id.
    ///
    /// A no-op when the id is absent (the note may have been deleted
    /// while the job was in flight) or when a transcript is already set.
    pub async fn set_transcription(&self, id: &NoteId, text: &str) {
        let mut notes = self.notes.lock().await;
        let Some(note) = notes.iter_mut().find(|n| &n.id == id) else {
            warn!("Dropping transcript for unknown note id {}", id);
            return;
        };
        if note.transcription.is_some() {
            warn!("Note {} already transcribed, keeping existing text", id);
            return;
        }
        note.transcription = Some(text.to_string());
        self.persist(&notes).await;
    }

    /// Get a copy of the note with the given id
    pub async fn get(&self, id: &NoteId) -> Option<VoiceNote> {
        self.notes.lock().await.iter().find(|n| &n.id == id).cloned()
    }

    /// Get a copy of the whole collection
    pub async fn snapshot(&self) -> Vec<VoiceNote> {
        self.notes.lock().await.clone()
    }

    /// Number of notes currently held
    pub async fn len(&self) -> usize {
        self.notes.lock().await.len()
    }

    /// Whether the store holds no notes
    pub async fn is_empty(&self) -> bool {
        self.notes.lock().await.is_empty()
    }

    async fn persist(&self, notes: &[VoiceNote]) {
        let blob = match serde_json::to_string(notes) {
            Ok(blob) => blob,
            Err(e) => {
                warn!("Failed to serialize note collection: {}", e);
                return;
            }
        };
        if let Err(e) = self.blob.write(&blob).await {
            warn!("Note storage write failed, in-memory state kept: {}", e);
        }
    }
}
