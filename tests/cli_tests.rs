//! Binary-level CLI tests
//!
//! Commands touching audio hardware or the network are not run here;
//! these tests cover argument handling, config management, and the
//! read-only paths against isolated XDG directories.

use assert_cmd::Command;
use predicates::prelude::*;

fn voice_notes(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("voice-notes").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("ASSEMBLYAI_API_KEY");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    voice_notes(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("record"))
        .stdout(predicate::str::contains("transcribe"))
        .stdout(predicate::str::contains("play"));
}

#[test]
fn list_with_no_notes_reports_empty() {
    let dir = tempfile::tempdir().unwrap();
    voice_notes(dir.path())
        .arg("list")
        .assert()
        .success()
        .stderr(predicate::str::contains("No notes"));
}

#[test]
fn delete_unknown_note_fails() {
    let dir = tempfile::tempdir().unwrap();
    voice_notes(dir.path())
        .args(["delete", "12345"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("12345"));
}

#[test]
fn transcribe_without_api_key_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    voice_notes(dir.path())
        .args(["transcribe", "12345"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key"));
}

#[test]
fn config_path_points_into_config_dir() {
    let dir = tempfile::tempdir().unwrap();
    voice_notes(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn config_set_then_get_round_trips() {
    let dir = tempfile::tempdir().unwrap();

    voice_notes(dir.path())
        .args(["config", "set", "speech_model", "universal"])
        .assert()
        .success();

    voice_notes(dir.path())
        .args(["config", "get", "speech_model"])
        .assert()
        .success()
        .stdout(predicate::str::contains("universal"));
}

#[test]
fn config_get_unknown_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    voice_notes(dir.path())
        .args(["config", "get", "unknown_key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Valid keys"));
}

#[test]
fn config_rejects_invalid_poll_interval() {
    let dir = tempfile::tempdir().unwrap();
    voice_notes(dir.path())
        .args(["config", "set", "poll_interval_secs", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("seconds"));
}

#[test]
fn api_key_is_masked_in_config_output() {
    let dir = tempfile::tempdir().unwrap();

    voice_notes(dir.path())
        .args(["config", "set", "api_key", "abcdefghijklmnop"])
        .assert()
        .success();

    voice_notes(dir.path())
        .args(["config", "get", "api_key"])
        .assert()
        .success()
        .stdout(predicate::str::contains("abcd...mnop"))
        .stdout(predicate::str::contains("abcdefghijklmnop").not());
}
