//! Command runners

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::AsyncBufReadExt;

use crate::application::ports::{PermissionProbe, PlaybackProgress, PositionCallback};
use crate::application::{CoordinatorError, NoteCoordinator, TranscribeOutcome};
use crate::domain::config::AppConfig;
use crate::domain::note::{NoteId, VoiceNote};
use crate::infrastructure::{
    AssemblyAiTranscriber, CpalPermissionProbe, DeviceAudioTransport, JsonFileStore, XdgConfigStore,
};

use super::args::Commands;
use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

type Coordinator = NoteCoordinator<DeviceAudioTransport, AssemblyAiTranscriber, JsonFileStore>;

/// Load config from file and merge CLI overrides on top of defaults
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    use crate::application::ports::ConfigStore;

    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Ignoring unreadable config file: {}", e);
            AppConfig::empty()
        }
    };

    AppConfig::defaults().merge(file_config).merge(cli_config)
}

/// Get API key from environment or config file
fn get_api_key(config: &AppConfig) -> Result<String, String> {
    if let Ok(key) = env::var("ASSEMBLYAI_API_KEY") {
        if !key.is_empty() {
            return Ok(key);
        }
    }

    if let Some(key) = &config.api_key {
        if !key.is_empty() {
            return Ok(key.clone());
        }
    }

    Err("Missing API key. Set ASSEMBLYAI_API_KEY or configure via 'voice-notes config set api_key <key>'".to_string())
}

/// Directory recordings land in when not configured
fn resolve_notes_dir(config: &AppConfig) -> PathBuf {
    match &config.notes_dir {
        Some(dir) => PathBuf::from(dir),
        None => dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voice-notes")
            .join("recordings"),
    }
}

fn build_coordinator(config: &AppConfig, api_key: String) -> Coordinator {
    let mut transcriber = AssemblyAiTranscriber::new(api_key)
        .with_speech_model(config.speech_model_or_default())
        .with_polling(
            config.poll_interval_or_default(),
            config.max_poll_attempts_or_default(),
        );
    if let Some(base_url) = &config.api_base_url {
        transcriber = transcriber.with_base_url(base_url.clone());
    }

    NoteCoordinator::new(
        DeviceAudioTransport::new(),
        transcriber,
        JsonFileStore::new(),
        resolve_notes_dir(config),
    )
}

/// Run a top-level command
pub async fn run_command(command: Commands, config: AppConfig) -> ExitCode {
    let presenter = Presenter::new();

    // Transcription is the only operation that needs the credential
    let api_key = match command {
        Commands::Transcribe { .. } => match get_api_key(&config) {
            Ok(key) => key,
            Err(e) => {
                presenter.error(&e);
                return ExitCode::from(EXIT_ERROR);
            }
        },
        _ => String::new(),
    };

    let coordinator = build_coordinator(&config, api_key);
    coordinator.init().await;

    match command {
        Commands::Record => run_record(&coordinator, presenter).await,
        Commands::List => run_list(&coordinator, presenter).await,
        Commands::Play { id } => run_play(&coordinator, presenter, &id).await,
        Commands::Delete { id } => run_delete(&coordinator, presenter, &id).await,
        Commands::Transcribe { id, .. } => run_transcribe(&coordinator, presenter, &id).await,
        Commands::Config { .. } => unreachable!("handled before coordinator setup"),
    }
}

async fn run_record(coordinator: &Coordinator, presenter: Presenter) -> ExitCode {
    // One-shot startup check; denial is a warning, not a hard stop
    if !CpalPermissionProbe::new().microphone().await.is_granted() {
        presenter.warn("Microphone access unavailable; recording may fail");
    }

    let path = match coordinator.start_recording().await {
        Ok(path) => path,
        Err(e) => {
            presenter.error(&format!("Failed to start recording: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };
    presenter.info(&format!("Recording to {}", path.display()));
    presenter.info("Press Enter or Ctrl-C to stop");

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = lines.next_line() => {}
    }

    match coordinator.finish_recording().await {
        Ok(note) => {
            presenter.success(&format!("Saved note {}", note.id));
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&format!("Recording failed, no note was saved: {}", e));
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn run_list(coordinator: &Coordinator, presenter: Presenter) -> ExitCode {
    let notes = coordinator.notes().await;

    if notes.is_empty() {
        presenter.info("No notes recorded yet");
        return ExitCode::from(EXIT_SUCCESS);
    }

    for note in &notes {
        presenter.output(&format_note_line(note));
        if let Some(preview) = note.transcription_preview() {
            presenter.output(&format!("    {}", preview));
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}

fn format_note_line(note: &VoiceNote) -> String {
    let when = note
        .timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S");
    let badge = if note.is_new() { "  NEW" } else { "" };
    format!("{}  {}  {}{}", note.id, when, note.path.display(), badge)
}

async fn run_play(coordinator: &Coordinator, presenter: Presenter, id: &str) -> ExitCode {
    let note_id = NoteId::from(id);

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<PlaybackProgress>();
    let on_position: PositionCallback = Arc::new(move |progress| {
        let _ = tx.send(progress);
    });

    if let Err(e) = coordinator.play(&note_id, on_position).await {
        presenter.error(&e.to_string());
        return ExitCode::from(EXIT_ERROR);
    }

    presenter.info("Playing - p pauses, r resumes, Enter stops");

    let bar = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::default_bar().template("[{bar:30.cyan/blue}] {msg}") {
        bar.set_style(style.progress_chars("=> "));
    }

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            progress = rx.recv() => {
                match progress {
                    Some(p) if p.finished => {
                        bar.finish_with_message("done");
                        break;
                    }
                    Some(p) => {
                        if p.duration_ms > 0 {
                            bar.set_position((p.position_ms * 100 / p.duration_ms).min(100));
                        }
                        bar.set_message(format!(
                            "{} / {}",
                            presenter.format_millis(p.position_ms),
                            presenter.format_millis(p.duration_ms)
                        ));
                    }
                    None => break,
                }
            }
            line = lines.next_line() => {
                let command = line.ok().flatten().unwrap_or_default();
                match command.trim() {
                    "p" => {
                        if let Err(e) = coordinator.pause().await {
                            presenter.warn(&e.to_string());
                        }
                    }
                    "r" => {
                        if let Err(e) = coordinator.resume().await {
                            presenter.warn(&e.to_string());
                        }
                    }
                    _ => {
                        bar.finish_and_clear();
                        if let Err(e) = coordinator.stop_playback().await {
                            presenter.warn(&e.to_string());
                        }
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                bar.finish_and_clear();
                if let Err(e) = coordinator.stop_playback().await {
                    presenter.warn(&e.to_string());
                }
                break;
            }
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}

async fn run_delete(coordinator: &Coordinator, presenter: Presenter, id: &str) -> ExitCode {
    let note_id = NoteId::from(id);

    match coordinator.delete_note(&note_id).await {
        Ok(()) => {
            presenter.success(&format!("Deleted note {}", note_id));
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn run_transcribe(coordinator: &Coordinator, mut presenter: Presenter, id: &str) -> ExitCode {
    let note_id = NoteId::from(id);

    presenter.start_spinner("Transcribing...");

    match coordinator.transcribe(&note_id).await {
        Ok(TranscribeOutcome::Transcribed(text)) => {
            presenter.spinner_success("Transcription complete");
            presenter.output(&text);
            ExitCode::from(EXIT_SUCCESS)
        }
        Ok(TranscribeOutcome::AlreadyTranscribed(text)) => {
            presenter.spinner_success("Already transcribed");
            presenter.output(&text);
            ExitCode::from(EXIT_SUCCESS)
        }
        Ok(outcome @ TranscribeOutcome::Failed(_)) => {
            presenter.spinner_fail(outcome.display_text());
            if let TranscribeOutcome::Failed(e) = outcome {
                presenter.error(&e.to_string());
            }
            ExitCode::from(EXIT_ERROR)
        }
        Err(e @ CoordinatorError::NoteNotFound(_)) => {
            presenter.spinner_fail("No such note");
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_USAGE_ERROR)
        }
        Err(e) => {
            presenter.spinner_fail("Transcription failed");
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}
