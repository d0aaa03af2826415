//! Main entrypoint for the repeat-chat drill tool.
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing logging.
//! 3. Wiring the dialogue service and speech backend.
//! 4. Running one interactive drill session.

mod config;
mod playback;
mod session;
mod speech;

use crate::config::Config;
use crate::playback::TerminalInput;
use crate::session::run_session;
use crate::speech::{OpenAiSpeaker, SilentSpeaker, Speaker};
use anyhow::Context;
use async_openai::config::OpenAIConfig;
use clap::Parser;
use repeat_chat_core::service::{DialogueOptions, OpenAiDialogueService};
use tracing::info;

/// Practice a spoken two-role dialogue, line by line.
#[derive(Parser, Debug)]
#[command(name = "repeat-chat", version, about)]
struct Cli {
    /// Scene for the dialogue, e.g. "at a hospital". Defaults to "at a café".
    scene: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    // Logs go to stderr so they never interleave with the drill text.
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let openai_config = OpenAIConfig::new()
        .with_api_key(config.api_key.clone())
        .with_api_base(config.api_base.clone());

    let service = OpenAiDialogueService::new(openai_config.clone(), config.chat_model.clone());
    let speaker: Box<dyn Speaker> = if config.speech_enabled {
        Box::new(OpenAiSpeaker::new(
            openai_config,
            &config.tts_model,
            &config.tts_voice,
        ))
    } else {
        Box::new(SilentSpeaker)
    };

    let options = DialogueOptions {
        learner_language: config.learner_language.clone(),
        feedback_language: config.feedback_language.clone(),
        gloss_lines: config.gloss_lines,
        turns: config.dialogue_turns,
    };

    info!(
        model = %config.chat_model,
        learner = %config.learner_language,
        feedback = %config.feedback_language,
        speech = config.speech_enabled,
        "starting drill session"
    );

    let mut input = TerminalInput;
    let mut stdout = std::io::stdout();
    run_session(
        &service,
        speaker.as_ref(),
        &mut input,
        &mut stdout,
        cli.scene.as_deref(),
        &options,
    )
    .await
}
