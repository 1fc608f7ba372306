//! End-to-end coordinator scenarios over mock ports
//!
//! The audio transport and transcription service are test doubles; the
//! durable blob is the real JSON file backend in a temp directory.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;

use voice_notes::application::ports::{
    AudioError, AudioTransport, NoteTranscriber, PlaybackProgress, PositionCallback,
    TranscriptionError,
};
use voice_notes::application::session::COMPLETED_DURATION_PLACEHOLDER_MS;
use voice_notes::application::{AudioSessionController, NoteCoordinator, TranscribeOutcome};
use voice_notes::domain::audio::AudioSessionState;
use voice_notes::infrastructure::JsonFileStore;

/// Transport double tracking stream lifecycles
#[derive(Default)]
struct TrackingTransport {
    recording: StdMutex<Option<PathBuf>>,
    last_callback: StdMutex<Option<PositionCallback>>,
    active_players: AtomicUsize,
    max_active_players: AtomicUsize,
    player_stops: AtomicUsize,
}

impl TrackingTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fire the position callback of the most recent playback
    fn emit(&self, progress: PlaybackProgress) {
        let callback = self.last_callback.lock().unwrap().clone();
        if let Some(cb) = callback {
            cb(progress);
        }
    }
}

/// Newtype so the crate-foreign `AudioTransport` can be implemented for a
/// shareable handle without tripping the orphan rule (`Arc` is not a
/// fundamental type). Cloning shares the underlying tracker.
#[derive(Clone)]
struct SharedTransport(Arc<TrackingTransport>);

#[async_trait]
impl AudioTransport for SharedTransport {
    async fn start_recorder(&self, path: &Path) -> Result<(), AudioError> {
        self.0.start_recorder(path).await
    }

    async fn stop_recorder(&self) -> Result<PathBuf, AudioError> {
        self.0.stop_recorder().await
    }

    async fn start_player(
        &self,
        path: &Path,
        on_position: PositionCallback,
    ) -> Result<(), AudioError> {
        self.0.start_player(path, on_position).await
    }

    async fn pause_player(&self) -> Result<(), AudioError> {
        self.0.pause_player().await
    }

    async fn resume_player(&self) -> Result<(), AudioError> {
        self.0.resume_player().await
    }

    async fn stop_player(&self) -> Result<(), AudioError> {
        self.0.stop_player().await
    }
}

#[async_trait]
impl AudioTransport for TrackingTransport {
    async fn start_recorder(&self, path: &Path) -> Result<(), AudioError> {
        *self.recording.lock().unwrap() = Some(path.to_path_buf());
        Ok(())
    }

    async fn stop_recorder(&self) -> Result<PathBuf, AudioError> {
        self.recording
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| AudioError::RecorderStopFailed("not recording".into()))
    }

    async fn start_player(
        &self,
        _path: &Path,
        on_position: PositionCallback,
    ) -> Result<(), AudioError> {
        let now_active = self.active_players.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active_players.fetch_max(now_active, Ordering::SeqCst);
        *self.last_callback.lock().unwrap() = Some(on_position);
        Ok(())
    }

    async fn pause_player(&self) -> Result<(), AudioError> {
        Ok(())
    }

    async fn resume_player(&self) -> Result<(), AudioError> {
        Ok(())
    }

    async fn stop_player(&self) -> Result<(), AudioError> {
        if self.active_players.load(Ordering::SeqCst) > 0 {
            self.active_players.fetch_sub(1, Ordering::SeqCst);
        }
        self.player_stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Transcriber double counting service invocations
struct CountingTranscriber {
    calls: AtomicUsize,
    result: Result<String, TranscriptionError>,
}

impl CountingTranscriber {
    fn returning(text: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            result: Ok(text.to_string()),
        })
    }

    fn failing(detail: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            result: Err(TranscriptionError::Remote(detail.to_string())),
        })
    }
}

#[async_trait]
impl NoteTranscriber for CountingTranscriber {
    async fn transcribe(&self, _path: &Path) -> Result<String, TranscriptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Newtype so `NoteTranscriber` can be implemented for a shareable handle
/// without tripping the orphan rule. Cloning shares the call counter.
#[derive(Clone)]
struct SharedTranscriber(Arc<CountingTranscriber>);

#[async_trait]
impl NoteTranscriber for SharedTranscriber {
    async fn transcribe(&self, path: &Path) -> Result<String, TranscriptionError> {
        self.0.transcribe(path).await
    }
}

type TestCoordinator = NoteCoordinator<SharedTransport, SharedTranscriber, JsonFileStore>;

fn coordinator_at(
    dir: &Path,
    transport: Arc<TrackingTransport>,
    transcriber: Arc<CountingTranscriber>,
) -> TestCoordinator {
    NoteCoordinator::new(
        SharedTransport(transport),
        SharedTranscriber(transcriber),
        JsonFileStore::with_path(dir.join("notes.json")),
        dir.join("recordings"),
    )
}

#[tokio::test]
async fn recorded_note_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let transport = TrackingTransport::new();

    let recorded = {
        let coordinator = coordinator_at(
            dir.path(),
            Arc::clone(&transport),
            CountingTranscriber::returning("unused"),
        );
        coordinator.init().await;
        coordinator.start_recording().await.unwrap();
        coordinator.finish_recording().await.unwrap()
    };

    assert!(recorded
        .path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("note_"));

    let coordinator = coordinator_at(dir.path(), transport, CountingTranscriber::returning("unused"));
    let notes = coordinator.init().await;

    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, recorded.id);
    assert_eq!(notes[0].path, recorded.path);
    assert_eq!(notes[0].transcription, None);
}

#[tokio::test]
async fn transcript_is_persisted_and_not_refetched() {
    let dir = tempfile::tempdir().unwrap();
    let transport = TrackingTransport::new();
    let transcriber = CountingTranscriber::returning("hello world");

    let id = {
        let coordinator =
            coordinator_at(dir.path(), Arc::clone(&transport), Arc::clone(&transcriber));
        coordinator.init().await;
        coordinator.start_recording().await.unwrap();
        let note = coordinator.finish_recording().await.unwrap();

        let outcome = coordinator.transcribe(&note.id).await.unwrap();
        assert!(matches!(outcome, TranscribeOutcome::Transcribed(_)));
        note.id
    };

    let coordinator = coordinator_at(dir.path(), transport, Arc::clone(&transcriber));
    coordinator.init().await;

    let outcome = coordinator.transcribe(&id).await.unwrap();
    match outcome {
        TranscribeOutcome::AlreadyTranscribed(text) => assert_eq!(text, "hello world"),
        other => panic!("Expected already-transcribed, got {:?}", other),
    }
    assert_eq!(transcriber.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_transcription_is_retried_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let transport = TrackingTransport::new();
    let failing = CountingTranscriber::failing("bad audio");

    let id = {
        let coordinator = coordinator_at(dir.path(), Arc::clone(&transport), Arc::clone(&failing));
        coordinator.init().await;
        coordinator.start_recording().await.unwrap();
        let note = coordinator.finish_recording().await.unwrap();

        let outcome = coordinator.transcribe(&note.id).await.unwrap();
        assert!(outcome.is_failed());
        note.id
    };

    // Nothing durable was written for the failure
    let transcriber = CountingTranscriber::returning("hello world");
    let coordinator = coordinator_at(dir.path(), transport, Arc::clone(&transcriber));
    coordinator.init().await;

    let outcome = coordinator.transcribe(&id).await.unwrap();
    assert!(matches!(outcome, TranscribeOutcome::Transcribed(_)));
    assert_eq!(transcriber.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn delete_excludes_note_from_persisted_collection() {
    let dir = tempfile::tempdir().unwrap();
    let transport = TrackingTransport::new();

    let victim = {
        let coordinator = coordinator_at(
            dir.path(),
            Arc::clone(&transport),
            CountingTranscriber::returning("unused"),
        );
        coordinator.init().await;
        for _ in 0..3 {
            coordinator.start_recording().await.unwrap();
            coordinator.finish_recording().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        let victim = coordinator.notes().await[1].id.clone();
        coordinator.delete_note(&victim).await.unwrap();
        victim
    };

    let coordinator = coordinator_at(dir.path(), transport, CountingTranscriber::returning("unused"));
    let notes = coordinator.init().await;

    assert_eq!(notes.len(), 2);
    assert!(notes.iter().all(|n| n.id != victim));
}

#[tokio::test]
async fn starting_playback_twice_keeps_one_active_stream() {
    let dir = tempfile::tempdir().unwrap();
    let transport = TrackingTransport::new();
    let controller = AudioSessionController::new(
        SharedTransport(Arc::clone(&transport)),
        dir.path().join("recordings"),
    );

    let silent: PositionCallback = Arc::new(|_| {});
    controller
        .start_playback(Path::new("/tmp/a.wav"), Arc::clone(&silent))
        .await
        .unwrap();
    controller
        .start_playback(Path::new("/tmp/b.wav"), silent)
        .await
        .unwrap();

    assert_eq!(transport.max_active_players.load(Ordering::SeqCst), 1);
    assert_eq!(transport.active_players.load(Ordering::SeqCst), 1);
    assert_eq!(transport.player_stops.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn terminal_event_resets_session_and_rewrites_progress() {
    let dir = tempfile::tempdir().unwrap();
    let transport = TrackingTransport::new();
    let controller = AudioSessionController::new(
        SharedTransport(Arc::clone(&transport)),
        dir.path().join("recordings"),
    );

    let events: Arc<StdMutex<Vec<PlaybackProgress>>> = Arc::new(StdMutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let on_position: PositionCallback = Arc::new(move |p| sink.lock().unwrap().push(p));

    controller
        .start_playback(Path::new("/tmp/a.wav"), on_position)
        .await
        .unwrap();
    assert_eq!(controller.state(), AudioSessionState::Playing);

    transport.emit(PlaybackProgress {
        position_ms: 1500,
        duration_ms: 9000,
        finished: false,
    });
    transport.emit(PlaybackProgress {
        position_ms: 9000,
        duration_ms: 9000,
        finished: true,
    });

    assert_eq!(controller.state(), AudioSessionState::Idle);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].position_ms, 1500);
    assert_eq!(
        events[1],
        PlaybackProgress {
            position_ms: 0,
            duration_ms: COMPLETED_DURATION_PLACEHOLDER_MS,
            finished: true,
        }
    );
}

#[tokio::test]
async fn starting_playback_discards_in_flight_recording() {
    let dir = tempfile::tempdir().unwrap();
    let transport = TrackingTransport::new();
    let transcriber = CountingTranscriber::returning("unused");
    let coordinator = coordinator_at(dir.path(), Arc::clone(&transport), transcriber);
    coordinator.init().await;

    coordinator.start_recording().await.unwrap();

    let silent: PositionCallback = Arc::new(|_| {});
    coordinator
        .audio()
        .start_playback(Path::new("/tmp/a.wav"), silent)
        .await
        .unwrap();

    // Teardown consumed the recorder; no note was created
    assert!(coordinator.notes().await.is_empty());
    assert!(transport.recording.lock().unwrap().is_none());
}

#[tokio::test]
async fn transport_controls_are_guarded_when_idle() {
    let dir = tempfile::tempdir().unwrap();
    let transport = TrackingTransport::new();
    let coordinator = coordinator_at(
        dir.path(),
        transport,
        CountingTranscriber::returning("unused"),
    );

    assert!(coordinator.pause().await.is_err());
    assert!(coordinator.resume().await.is_err());
    assert!(coordinator.stop_playback().await.is_err());
}
