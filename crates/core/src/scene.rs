//! Scene resolution.

/// Scene used when the learner does not supply one.
pub const DEFAULT_SCENE: &str = "at a café";

/// Normalizes an optional free-text scene argument.
///
/// Whitespace-only or absent input falls back to [`DEFAULT_SCENE`]; anything
/// else is returned trimmed.
pub fn resolve(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(scene) if !scene.is_empty() => scene.to_string(),
        _ => DEFAULT_SCENE.to_string(),
    }
}
