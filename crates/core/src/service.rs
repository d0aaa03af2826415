//! Dialogue generation against an OpenAI-compatible chat-completion API.

use crate::dialogue::clean_text;
use anyhow::{Context, Result, bail};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{ChatCompletionRequestSystemMessageArgs, CreateChatCompletionRequestArgs},
};
use async_trait::async_trait;
use tracing::debug;

/// Immutable per-session generation parameters, built once at startup.
#[derive(Debug, Clone)]
pub struct DialogueOptions {
    /// Language the learner is practicing; the dialogue is written in it.
    pub learner_language: String,
    /// Language used for translations and explanations.
    pub feedback_language: String,
    /// Whether each utterance should carry a feedback-language gloss line.
    pub gloss_lines: bool,
    /// Number of alternating utterances to request.
    pub turns: usize,
}

/// Defines the contract for any service that can generate a practice dialogue.
///
/// The real implementation calls a remote model; tests substitute a scripted
/// one so the rest of the pipeline can be exercised without network access.
#[async_trait]
pub trait DialogueService: Send + Sync {
    /// Generates the raw, line-delimited dialogue text for a scene.
    ///
    /// One awaited, non-streaming call. Any failure (network, auth, quota,
    /// empty response) is fatal to the run and is not retried here.
    async fn generate_dialogue(&self, scene: &str, options: &DialogueOptions) -> Result<String>;
}

/// Builds the generation prompt.
///
/// The required output layout is the contract with [`crate::parser::parse`];
/// the wording here and the parser's line classifier must agree on the role
/// tags, header names and gloss marker.
pub fn build_prompt(scene: &str, options: &DialogueOptions) -> String {
    let mut prompt = format!(
        "Given the scene '{scene}', create a natural conversation setup with two \
         complementary roles and a short practice dialogue between them.\n\
         The dialogue must be entirely in {learner}, including the role descriptions.\n\
         Produce {turns} alternating dialogue lines, starting with Role A.\n\
         Keep each line short enough to repeat aloud.\n",
        scene = scene,
        learner = options.learner_language,
        turns = options.turns,
    );
    if options.gloss_lines {
        prompt.push_str(&format!(
            "After each dialogue line, add exactly one line starting with \"> \" \
             containing a {} translation of that line.\n",
            options.feedback_language
        ));
    }
    prompt.push_str(
        "Output format, with no other commentary:\n\
         Scene: <scene>\n\
         Role A: <description>\n\
         Role B: <description>\n\
         ---\n\
         A: <line>\n",
    );
    if options.gloss_lines {
        prompt.push_str("> <translation>\n");
    }
    prompt.push_str("B: <line>\n");
    if options.gloss_lines {
        prompt.push_str("> <translation>\n");
    }
    prompt
}

/// An implementation of [`DialogueService`] for any OpenAI-compatible API.
pub struct OpenAiDialogueService {
    client: Client<OpenAIConfig>,
    model: String,
}

// Token budget per requested utterance, plus headroom for the headers.
const TOKENS_PER_TURN: u32 = 60;
const TOKEN_HEADROOM: u32 = 150;

impl OpenAiDialogueService {
    /// Creates a new service for an OpenAI-compatible endpoint.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration, including key and base URL.
    /// * `model` - Chat model identifier (e.g. "gpt-4.1-mini").
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

#[async_trait]
impl DialogueService for OpenAiDialogueService {
    async fn generate_dialogue(&self, scene: &str, options: &DialogueOptions) -> Result<String> {
        let prompt = build_prompt(scene, options);
        debug!(%scene, model = %self.model, "requesting dialogue");

        let mut max_tokens = options.turns as u32 * TOKENS_PER_TURN + TOKEN_HEADROOM;
        if options.gloss_lines {
            max_tokens *= 2;
        }
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(prompt)
                    .build()?
                    .into(),
            ])
            .max_completion_tokens(max_tokens)
            .temperature(0.8)
            .build()?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .context("Dialogue generation request failed")?;

        let content = response
            .choices
            .first()
            .context("No response choice from the model")?
            .message
            .content
            .as_ref()
            .context("No content in the model response")?;

        let text = clean_text(content);
        if text.is_empty() {
            bail!("The model returned an empty dialogue");
        }
        Ok(text.to_string())
    }
}

/// A [`DialogueService`] that replays a fixed response.
///
/// Useful for tests and for exercising the playback loop offline.
pub struct ScriptedDialogueService {
    response: String,
}

impl ScriptedDialogueService {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

#[async_trait]
impl DialogueService for ScriptedDialogueService {
    async fn generate_dialogue(&self, _scene: &str, _options: &DialogueOptions) -> Result<String> {
        Ok(self.response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn options(gloss: bool) -> DialogueOptions {
        DialogueOptions {
            learner_language: "English".to_string(),
            feedback_language: "Japanese".to_string(),
            gloss_lines: gloss,
            turns: 8,
        }
    }

    #[test]
    fn prompt_names_scene_languages_and_layout() {
        let prompt = build_prompt("at a hospital", &options(true));
        assert!(prompt.contains("at a hospital"));
        assert!(prompt.contains("English"));
        assert!(prompt.contains("Japanese translation"));
        assert!(prompt.contains("Role A: <description>"));
        assert!(prompt.contains("8 alternating dialogue lines"));
        assert!(prompt.contains("> <translation>"));
    }

    #[test]
    fn monolingual_prompt_omits_gloss_instructions() {
        let prompt = build_prompt("at a hospital", &options(false));
        assert!(!prompt.contains("translation"));
    }

    #[tokio::test]
    async fn scripted_service_feeds_the_parser() {
        let raw = "\
Scene: at the airport
Role A: a traveler at the check-in desk
Role B: an airline agent
---
A: I'd like to check in for my flight to Osaka.
B: May I see your passport, please?
A: Here you go.
B: Thank you, you're all set.
";
        let service = ScriptedDialogueService::new(raw);
        let text = service
            .generate_dialogue("at the airport", &options(false))
            .await
            .unwrap();
        let dialogue = parse(&text, false).unwrap();
        assert_eq!(dialogue.lines.len(), 4);
        assert!(dialogue.lines.iter().all(|l| l.gloss.is_none()));
        assert!(
            dialogue
                .lines
                .windows(2)
                .all(|pair| pair[0].role != pair[1].role),
            "roles must alternate"
        );
    }
}
