//! Spoken riddles.
//!
//! * [`SpeechOutput`]: the seam the game talks to.
//! * [`SpeechPlayer`]: remote synthesis + audio output, offline fallback.
//! * [`SpeechSynthesizer`] / [`GeminiSpeech`]: remote TTS.
//! * [`LocalVoice`] / [`CommandVoice`]: offline TTS via a local program.

pub mod local;
pub mod player;
pub mod synth;

pub use local::{words_per_minute, CommandVoice, LocalVoice};
pub use player::{PlaybackOutcome, SpeechOutput, SpeechPlayer};
pub use synth::{GeminiSpeech, SpeechError, SpeechSynthesizer};
