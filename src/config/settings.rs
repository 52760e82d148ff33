//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

/// Environment variables checked (in order) for the remote service key.
pub const API_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

// ---------------------------------------------------------------------------
// GeminiConfig
// ---------------------------------------------------------------------------

/// Connection settings for the remote generative-AI service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Base URL of the REST API, without the `/v1beta` suffix.
    pub base_url: String,
    /// API key.  `None` disables the remote calls; the fallbacks still work.
    pub api_key: Option<String>,
    /// Model used for riddle text generation.
    pub text_model: String,
    /// Model used for speech synthesis.
    pub speech_model: String,
    /// Prebuilt voice name passed to the speech model.
    pub voice: String,
    /// Maximum seconds to wait for a response before timing out.
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".into(),
            api_key: None,
            text_model: "gemini-2.5-flash".into(),
            speech_model: "gemini-2.5-flash-preview-tts".into(),
            voice: "Puck".into(),
            timeout_secs: 20,
        }
    }
}

impl GeminiConfig {
    /// Returns the key when it is present and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Settings for audio output and the offline voice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Sample rate of the synthesized PCM payload in Hz.
    pub sample_rate: u32,
    /// BCP-47 language tag used by the offline voice.
    pub language: String,
    /// Speaking-rate multiplier for the offline voice (1.0 = normal).
    pub fallback_rate: f32,
    /// Program used for offline speech (`espeak-ng`, `say`, …).
    pub local_program: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        let local_program = if cfg!(target_os = "macos") {
            "say"
        } else {
            "espeak-ng"
        };

        Self {
            sample_rate: 24_000,
            language: "en-US".into(),
            fallback_rate: 0.8,
            local_program: local_program.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Quiz session rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of rounds in one session.
    pub total_rounds: u32,
    /// Points awarded for a correct first answer.
    pub points_per_correct: u32,
    /// How long the answer feedback stays on screen before the next round.
    pub advance_delay_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            total_rounds: 5,
            points_per_correct: 10,
            advance_delay_ms: 2_500,
        }
    }
}

/// First non-blank value among [`API_KEY_VARS`].
pub fn api_key_from_env() -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|key| !key.trim().is_empty())
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use sound_safari::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote service settings.
    pub gemini: GeminiConfig,
    /// Audio output / offline voice settings.
    pub speech: SpeechConfig,
    /// Session rules.
    pub game: GameConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml` and
    /// apply the API key from the environment, if set.
    ///
    /// Returns the default configuration when the file does not exist yet.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&AppPaths::new().settings_file)?;
        config.apply_api_key(api_key_from_env());
        Ok(config)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Override the stored key with `key` when it is non-blank.
    pub fn apply_api_key(&mut self, key: Option<String>) {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.gemini.api_key = Some(key);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
