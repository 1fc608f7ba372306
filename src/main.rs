//! VoiceNotes CLI entry point

use std::process::ExitCode;

use clap::Parser;

use voice_notes::cli::{
    app::{load_merged_config, run_command, EXIT_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
};
use voice_notes::domain::config::AppConfig;
use voice_notes::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    let presenter = Presenter::new();

    match cli.command {
        // Config management needs no audio or network setup
        Commands::Config { action } => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::SUCCESS
        }
        command => {
            // Build CLI config from args
            let cli_config = AppConfig {
                api_key: None, // API key comes from env/file only
                notes_dir: cli.notes_dir.clone(),
                speech_model: match &command {
                    Commands::Transcribe { speech_model, .. } => speech_model.clone(),
                    _ => None,
                },
                ..Default::default()
            };

            let config = load_merged_config(cli_config).await;

            run_command(command, config).await
        }
    }
}
