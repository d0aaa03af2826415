//! Wires one full drill session: resolve the scene, generate and parse the
//! dialogue, then hand the lines to the playback driver.

use crate::playback::{PacingInput, PlaybackDriver};
use crate::speech::Speaker;
use anyhow::{Context, Result};
use repeat_chat_core::{
    parser,
    scene,
    service::{DialogueOptions, DialogueService},
};
use std::io::Write;
use tracing::info;

pub async fn run_session<W: Write>(
    service: &dyn DialogueService,
    speaker: &dyn Speaker,
    input: &mut dyn PacingInput,
    out: &mut W,
    scene_arg: Option<&str>,
    options: &DialogueOptions,
) -> Result<()> {
    let scene = scene::resolve(scene_arg);
    info!(%scene, turns = options.turns, "generating dialogue");

    let raw = service.generate_dialogue(&scene, options).await?;
    let dialogue =
        parser::parse(&raw, options.gloss_lines).context("Could not parse the model response")?;
    info!(lines = dialogue.lines.len(), "dialogue ready");

    writeln!(out, "scene: {}", dialogue.scene.as_deref().unwrap_or(&scene))?;
    if let Some(role_a) = &dialogue.roles.role_a {
        writeln!(out, "role A: {role_a}")?;
    }
    if let Some(role_b) = &dialogue.roles.role_b {
        writeln!(out, "role B: {role_b}")?;
    }

    let mut driver = PlaybackDriver::new(speaker, &options.learner_language, &mut *out);
    driver.run(&dialogue.lines, input).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::PacingSignal;
    use async_trait::async_trait;
    use repeat_chat_core::service::ScriptedDialogueService;
    use std::collections::VecDeque;
    use std::io;
    use std::sync::Mutex;

    struct ScriptedInput(VecDeque<PacingSignal>);

    impl PacingInput for ScriptedInput {
        fn read_signal(&mut self) -> io::Result<PacingSignal> {
            self.0.pop_front().ok_or_else(|| {
                io::Error::new(io::ErrorKind::UnexpectedEof, "input script exhausted")
            })
        }
    }

    #[derive(Default)]
    struct RecordingSpeaker(Mutex<Vec<String>>);

    #[async_trait]
    impl Speaker for RecordingSpeaker {
        async fn speak(&self, text: &str, _language: &str) -> Result<()> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct FailingService;

    #[async_trait]
    impl DialogueService for FailingService {
        async fn generate_dialogue(
            &self,
            _scene: &str,
            _options: &DialogueOptions,
        ) -> Result<String> {
            anyhow::bail!("401 Unauthorized: invalid API key")
        }
    }

    fn options(gloss: bool) -> DialogueOptions {
        DialogueOptions {
            learner_language: "English".to_string(),
            feedback_language: "Japanese".to_string(),
            gloss_lines: gloss,
            turns: 4,
        }
    }

    const NO_GLOSS_RESPONSE: &str = "\
Scene: at a café
Role A: a customer ordering a drink
Role B: a barista taking orders
---
A: Hi, could I get a small coffee?
B: Of course, anything to eat with that?
A: No thanks, just the coffee.
B: Coming right up.
";

    #[tokio::test]
    async fn absent_scene_runs_the_default_scene_to_completion() {
        let service = ScriptedDialogueService::new(NO_GLOSS_RESPONSE);
        let speaker = RecordingSpeaker::default();
        let mut input = ScriptedInput([PacingSignal::Advance; 4].into());
        let mut out = Vec::new();

        run_session(&service, &speaker, &mut input, &mut out, None, &options(false))
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("scene: at a café"));
        assert!(text.contains("role A: a customer ordering a drink"));
        assert!(text.contains("role B: a barista taking orders"));
        assert_eq!(text.matches("--------").count(), 4);
    }

    #[tokio::test]
    async fn bilingual_response_attaches_a_distinct_gloss_to_every_line() {
        let raw = "\
Role A: a guest
Role B: a receptionist
A: I have a reservation.
> 予約してあります。
B: May I have your name?
> お名前をいただけますか？
";
        let service = ScriptedDialogueService::new(raw);
        let text = service
            .generate_dialogue("at a hotel", &options(true))
            .await
            .unwrap();
        let dialogue = parser::parse(&text, true).unwrap();

        assert_eq!(dialogue.lines.len(), 2);
        for line in &dialogue.lines {
            let gloss = line.gloss.as_deref().expect("every line should have a gloss");
            assert!(!gloss.is_empty());
            assert_ne!(gloss, line.text);
        }
    }

    #[tokio::test]
    async fn request_failure_is_fatal_before_any_playback() {
        let speaker = RecordingSpeaker::default();
        let mut input = ScriptedInput(VecDeque::new());
        let mut out = Vec::new();

        let err = run_session(
            &FailingService,
            &speaker,
            &mut input,
            &mut out,
            Some("at a bank"),
            &options(false),
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("401"));
        assert!(speaker.0.lock().unwrap().is_empty());
        assert!(!String::from_utf8(out).unwrap().contains("--------"));
    }

    #[tokio::test]
    async fn unparseable_response_is_fatal() {
        let service = ScriptedDialogueService::new("Sorry, I cannot help with that.");
        let speaker = RecordingSpeaker::default();
        let mut input = ScriptedInput(VecDeque::new());
        let mut out = Vec::new();

        let err = run_session(&service, &speaker, &mut input, &mut out, None, &options(false))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Could not parse"));
        assert!(speaker.0.lock().unwrap().is_empty());
    }
}
