//! Domain types for a generated practice dialogue.
//!
//! A dialogue is produced once per session by the [`crate::service`] layer,
//! parsed into these types by [`crate::parser`], and then consumed read-only
//! by the playback loop. Nothing here is mutated after parse time.

use serde::{Deserialize, Serialize};

/// One of the two participants in a generated dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    A,
    B,
}

impl Role {
    /// Short label used in printed output and in the generation layout ("A"/"B").
    pub fn label(&self) -> &'static str {
        match self {
            Role::A => "A",
            Role::B => "B",
        }
    }
}

/// The two role descriptions invented by the model for a scene.
///
/// Either side may be missing when the model deviates from the requested
/// layout; the dialogue is still usable without them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePair {
    pub role_a: Option<String>,
    pub role_b: Option<String>,
}

/// A single utterance to be practiced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueLine {
    pub role: Role,
    /// The line in the learner language.
    pub text: String,
    /// Feedback-language rendering of `text`, when the session is bilingual
    /// and the model supplied one.
    pub gloss: Option<String>,
}

/// A fully parsed dialogue, in generation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialogue {
    /// The scene as restated by the model, when present in the response.
    pub scene: Option<String>,
    pub roles: RolePair,
    pub lines: Vec<DialogueLine>,
}

/// Strips surrounding whitespace and wrapping straight or curly double quotes.
///
/// Models frequently quote utterances even when asked not to.
pub fn clean_text(text: &str) -> &str {
    text.trim()
        .trim_matches(|c| c == '"' || c == '\u{201c}' || c == '\u{201d}')
        .trim()
}

/// Splits an utterance into sentences on `.`, `!` and `?` boundaries.
///
/// Used to synthesize speech in natural chunks. A trailing fragment without a
/// terminator is kept, and text with no terminator at all comes back as a
/// single element, so nothing the learner sees is silently dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }
    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}
