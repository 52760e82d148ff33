//! Configuration module for Sound Safari.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the remote
//! service, speech output and game rules, `AppPaths` for the platform config
//! directory, and TOML persistence via `AppConfig::load` / `AppConfig::save_to`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    api_key_from_env, AppConfig, GameConfig, GeminiConfig, SpeechConfig, API_KEY_VARS,
};
