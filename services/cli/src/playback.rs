//! The interactive line-by-line playback loop.
//!
//! Each dialogue line runs a small state machine: announce the line, speak
//! it, then wait for one pacing signal. A repeat signal re-runs the line from
//! the announcement; anything else advances. The driver is generic over its
//! output writer and takes the speaker and input source as trait objects, so
//! tests drive it with scripted input and a captured buffer.

use crate::speech::Speaker;
use anyhow::Result;
use repeat_chat_core::dialogue::{DialogueLine, split_sentences};
use std::io::{self, Write};
use tracing::warn;

/// What the learner asked for after a line was played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingSignal {
    /// Play the current line again.
    Repeat,
    /// Move on to the next line.
    Advance,
}

/// A blocking source of pacing signals.
pub trait PacingInput {
    fn read_signal(&mut self) -> io::Result<PacingSignal>;
}

/// Reads pacing signals from stdin, one line per signal.
///
/// `r` (or `repeat`) repeats; anything else, including end-of-input,
/// advances.
pub struct TerminalInput;

impl PacingInput for TerminalInput {
    fn read_signal(&mut self) -> io::Result<PacingSignal> {
        let mut buf = String::new();
        io::stdin().read_line(&mut buf)?;
        match buf.trim().to_ascii_lowercase().as_str() {
            "r" | "repeat" => Ok(PacingSignal::Repeat),
            _ => Ok(PacingSignal::Advance),
        }
    }
}

pub struct PlaybackDriver<'a, W: Write> {
    speaker: &'a dyn Speaker,
    /// Language the utterances are spoken in.
    language: &'a str,
    out: W,
    first_prompt: bool,
}

impl<'a, W: Write> PlaybackDriver<'a, W> {
    pub fn new(speaker: &'a dyn Speaker, language: &'a str, out: W) -> Self {
        Self {
            speaker,
            language,
            out,
            first_prompt: true,
        }
    }

    /// Drives one pass over the dialogue, in order, until the learner
    /// advances past the last line.
    pub async fn run(
        &mut self,
        lines: &[DialogueLine],
        input: &mut dyn PacingInput,
    ) -> Result<()> {
        for line in lines {
            loop {
                self.announce(line)?;
                if let Err(error) = self.speak_line(line).await {
                    // Audio is best-effort; the text is already on screen.
                    warn!(%error, "skipping audio for this line");
                }
                match self.await_signal(input)? {
                    PacingSignal::Repeat => continue,
                    PacingSignal::Advance => break,
                }
            }
        }
        Ok(())
    }

    fn announce(&mut self, line: &DialogueLine) -> io::Result<()> {
        writeln!(self.out, "--------")?;
        writeln!(self.out, "{}: {}", line.role.label(), line.text)?;
        if let Some(gloss) = &line.gloss {
            writeln!(self.out, "   {gloss}")?;
        }
        Ok(())
    }

    async fn speak_line(&self, line: &DialogueLine) -> Result<()> {
        for sentence in split_sentences(&line.text) {
            self.speaker.speak(&sentence, self.language).await?;
        }
        Ok(())
    }

    fn await_signal(&mut self, input: &mut dyn PacingInput) -> Result<PacingSignal> {
        let prompt = if self.first_prompt {
            "[r + enter to repeat, enter for next]> "
        } else {
            "> "
        };
        self.first_prompt = false;
        write!(self.out, "{prompt}")?;
        self.out.flush()?;
        Ok(input.read_signal()?)
    }
}
