use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
///
/// Constructed once in `main` and passed by reference afterwards; nothing
/// reads the environment past this point.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_key: String,
    pub api_base: String,
    pub chat_model: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub learner_language: String,
    pub feedback_language: String,
    /// Whether each utterance gets a feedback-language gloss line.
    pub gloss_lines: bool,
    /// Whether lines are spoken through the TTS backend.
    pub speech_enabled: bool,
    /// Number of dialogue utterances to request.
    pub dialogue_turns: usize,
    pub log_level: Level,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue(
            name.to_string(),
            format!("'{value}' is not a boolean"),
        )),
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?;
        let api_base = env_or("OPENAI_API_BASE", "https://api.openai.com/v1");
        let chat_model = env_or("CHAT_MODEL", "gpt-4.1-mini");
        let tts_model = env_or("TTS_MODEL", "tts-1");
        let tts_voice = env_or("TTS_VOICE", "alloy");

        let learner_language = env_or("LEARNER_LANGUAGE", "English");
        let feedback_language = env_or("FEEDBACK_LANGUAGE", "Japanese");

        // Glosses default to on exactly when the two languages differ, but the
        // flag is explicit so ambiguous pairs can override it.
        let gloss_lines = match std::env::var("GLOSS_LINES") {
            Ok(value) => parse_bool("GLOSS_LINES", &value)?,
            Err(_) => !learner_language.eq_ignore_ascii_case(&feedback_language),
        };

        let speech_enabled = match std::env::var("SPEECH") {
            Ok(value) => parse_bool("SPEECH", &value)?,
            Err(_) => true,
        };

        let dialogue_turns = match std::env::var("DIALOGUE_TURNS") {
            Ok(value) => value
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "DIALOGUE_TURNS".to_string(),
                        format!("'{value}' is not a positive integer"),
                    )
                })?,
            Err(_) => 8,
        };

        let log_level_str = env_or("RUST_LOG", "info");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{log_level_str}' is not a valid log level"),
            )
        })?;

        Ok(Self {
            api_key,
            api_base,
            chat_model,
            tts_model,
            tts_voice,
            learner_language,
            feedback_language,
            gloss_lines,
            speech_enabled,
            dialogue_turns,
            log_level,
        })
    }
}
