//! Speech synthesis and playback.
//!
//! Synthesis goes through the same OpenAI-compatible client as dialogue
//! generation; playback decodes the returned audio with rodio on a blocking
//! task. Playback blocks until the clip finishes, so a repeat can never
//! overlap the previous clip's audio.

use anyhow::{Context, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{CreateSpeechRequestArgs, SpeechModel, Voice},
};
use async_trait::async_trait;
use rodio::{Decoder, OutputStream, Sink};
use std::io::Cursor;
use tracing::{debug, warn};

/// Renders one piece of text as audio on the default output device.
///
/// The language tag is advisory; backends that infer language from the text
/// itself (like OpenAI TTS) ignore it.
#[async_trait]
pub trait Speaker: Send + Sync {
    /// Blocks (awaits) until the audio has finished playing.
    async fn speak(&self, text: &str, language: &str) -> Result<()>;
}

/// A [`Speaker`] that produces no audio, for text-only sessions.
pub struct SilentSpeaker;

#[async_trait]
impl Speaker for SilentSpeaker {
    async fn speak(&self, _text: &str, _language: &str) -> Result<()> {
        Ok(())
    }
}

/// A [`Speaker`] backed by an OpenAI-compatible speech endpoint.
pub struct OpenAiSpeaker {
    client: Client<OpenAIConfig>,
    model: SpeechModel,
    voice: Voice,
}

impl OpenAiSpeaker {
    pub fn new(config: OpenAIConfig, model: &str, voice: &str) -> Self {
        let model = match model {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        };
        let voice = match voice.to_ascii_lowercase().as_str() {
            "alloy" => Voice::Alloy,
            "echo" => Voice::Echo,
            "fable" => Voice::Fable,
            "onyx" => Voice::Onyx,
            "nova" => Voice::Nova,
            "shimmer" => Voice::Shimmer,
            other => {
                warn!(voice = other, "unknown TTS voice, falling back to alloy");
                Voice::Alloy
            }
        };
        Self {
            client: Client::with_config(config),
            model,
            voice,
        }
    }
}

#[async_trait]
impl Speaker for OpenAiSpeaker {
    async fn speak(&self, text: &str, language: &str) -> Result<()> {
        debug!(%language, chars = text.len(), "synthesizing speech");
        let request = CreateSpeechRequestArgs::default()
            .model(self.model.clone())
            .voice(self.voice.clone())
            .input(text)
            .build()?;
        let response = self
            .client
            .audio()
            .speech(request)
            .await
            .context("Speech synthesis request failed")?;

        let bytes = response.bytes.to_vec();
        tokio::task::spawn_blocking(move || play_buffered(bytes))
            .await
            .context("Audio playback task failed")?
    }
}

/// Decodes and plays a synthesized clip, returning once it has finished.
fn play_buffered(bytes: Vec<u8>) -> Result<()> {
    let (_stream, handle) =
        OutputStream::try_default().context("No audio output device available")?;
    let sink = Sink::try_new(&handle).context("Failed to open audio sink")?;
    let source =
        Decoder::new(Cursor::new(bytes)).context("Failed to decode synthesized audio")?;
    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}
