//! Riddle generation.
//!
//! * [`RiddleGenerator`]: async trait implemented by all riddle sources.
//! * [`GeminiRiddles`]: remote structured-output generation.
//! * [`FallbackRiddles`]: wraps any generator; returns [`fallback_riddle`]
//!   on failure.
//! * [`RiddlePrompt`]: prompt template and response schema.
//!
//! ```rust,no_run
//! use sound_safari::config::AppConfig;
//! use sound_safari::gemini::GeminiClient;
//! use sound_safari::riddle::{FallbackRiddles, GeminiRiddles, RiddleGenerator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let client = GeminiClient::from_config(&config.gemini);
//!     let riddles = FallbackRiddles::new(GeminiRiddles::new(client, &config.gemini.text_model));
//!
//!     // Always resolves to text.
//!     let riddle = riddles.generate("Lion").await.unwrap();
//!     println!("{riddle}");
//! }
//! ```

pub mod fallback;
pub mod generator;
pub mod prompt;

pub use fallback::{fallback_riddle, FallbackRiddles};
pub use generator::{parse_riddle, GeminiRiddles, RiddleGenerator};
pub use prompt::{RiddlePrompt, RIDDLE_FIELD};
