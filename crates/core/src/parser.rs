//! Tolerant parser for the line-delimited dialogue layout.
//!
//! The far end is a non-deterministic language model, so this is a
//! skip-unknown line classifier rather than a strict grammar: anything that
//! does not look like a header, an utterance, a gloss, or a separator is
//! ignored. The only fatal outcome is recovering zero utterances.

use crate::dialogue::{Dialogue, DialogueLine, Role, RolePair, clean_text};
use tracing::debug;

/// Failure to recover a usable dialogue from the model response.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no dialogue lines could be recovered from the model response")]
    EmptyDialogue,
}

/// True for visual separator rows such as `---` or `===`.
fn is_separator(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| matches!(c, '-' | '=' | '*' | '_'))
}

/// Strips a role tag (`A:` / `B:`, case-insensitive) from an utterance line.
fn strip_role_tag(line: &str) -> Option<(Role, &str)> {
    let mut chars = line.chars();
    let tag = chars.next()?;
    if chars.next()? != ':' {
        return None;
    }
    let role = match tag {
        'A' | 'a' => Role::A,
        'B' | 'b' => Role::B,
        _ => return None,
    };
    Some((role, chars.as_str()))
}

/// Case-insensitive prefix match returning the remainder.
fn strip_header<'a>(line: &'a str, header: &str) -> Option<&'a str> {
    match (line.get(..header.len()), line.get(header.len()..)) {
        (Some(prefix), Some(rest)) if prefix.eq_ignore_ascii_case(header) => Some(rest),
        _ => None,
    }
}

/// Parses a raw model response into a [`Dialogue`].
///
/// `attach_plain_gloss` controls whether an untagged line immediately after
/// an utterance is treated as that utterance's translation; it should be set
/// only for bilingual sessions. Explicitly marked gloss lines (`>` / `→`)
/// are attached regardless.
///
/// Pure function of its input: the same raw text always yields the same
/// dialogue.
pub fn parse(raw: &str, attach_plain_gloss: bool) -> Result<Dialogue, ParseError> {
    let mut scene = None;
    let mut roles = RolePair::default();
    let mut lines: Vec<DialogueLine> = Vec::new();
    // An untagged line may only gloss the utterance it directly follows.
    let mut plain_gloss_armed = false;

    for physical in raw.lines() {
        let line = physical.trim();
        if line.is_empty() {
            continue;
        }
        if is_separator(line) {
            plain_gloss_armed = false;
            continue;
        }
        if let Some(rest) = strip_header(line, "role a:") {
            // First occurrence wins; later duplicates are model noise.
            let desc = clean_text(rest);
            if roles.role_a.is_none() && !desc.is_empty() {
                roles.role_a = Some(desc.to_string());
            }
            plain_gloss_armed = false;
            continue;
        }
        if let Some(rest) = strip_header(line, "role b:") {
            let desc = clean_text(rest);
            if roles.role_b.is_none() && !desc.is_empty() {
                roles.role_b = Some(desc.to_string());
            }
            plain_gloss_armed = false;
            continue;
        }
        if let Some(rest) = strip_header(line, "scene:") {
            let desc = clean_text(rest);
            if scene.is_none() && !desc.is_empty() {
                scene = Some(desc.to_string());
            }
            plain_gloss_armed = false;
            continue;
        }
        if let Some((role, rest)) = strip_role_tag(line) {
            let text = clean_text(rest);
            if !text.is_empty() {
                lines.push(DialogueLine {
                    role,
                    text: text.to_string(),
                    gloss: None,
                });
                plain_gloss_armed = true;
            } else {
                plain_gloss_armed = false;
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix('>').or_else(|| line.strip_prefix('→')) {
            let gloss = clean_text(rest);
            if !gloss.is_empty() {
                if let Some(last) = lines.last_mut().filter(|l| l.gloss.is_none()) {
                    last.gloss = Some(gloss.to_string());
                }
            }
            plain_gloss_armed = false;
            continue;
        }
        if attach_plain_gloss && plain_gloss_armed {
            let gloss = clean_text(line);
            if !gloss.is_empty() {
                if let Some(last) = lines.last_mut().filter(|l| l.gloss.is_none()) {
                    last.gloss = Some(gloss.to_string());
                }
            }
            plain_gloss_armed = false;
            continue;
        }
        debug!(line, "skipping unrecognized line in model response");
        plain_gloss_armed = false;
    }

    if lines.is_empty() {
        return Err(ParseError::EmptyDialogue);
    }
    Ok(Dialogue { scene, roles, lines })
}
