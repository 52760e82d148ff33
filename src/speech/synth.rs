//! Remote speech synthesis.
//!
//! [`GeminiSpeech`] asks the speech model for `AUDIO` output with a prebuilt
//! voice and returns the base64 PCM payload untouched; decoding happens in
//! [`crate::audio::decode_pcm16`].

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use crate::audio::{OutputError, PcmError};
use crate::gemini::{candidate_audio, user_contents, GeminiClient, GeminiError};

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

/// Everything that can go wrong between text and audible speech.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// The synthesis request failed.
    #[error("speech synthesis failed: {0}")]
    Remote(#[from] GeminiError),

    /// The service answered without an audio payload.
    #[error("no audio data received")]
    MissingAudio,

    /// The payload could not be decoded.
    #[error("could not decode speech audio: {0}")]
    Decode(#[from] PcmError),

    /// The output device failed.
    #[error("audio output failed: {0}")]
    Output(#[from] OutputError),

    /// The offline voice could not speak.
    #[error("local voice failed: {0}")]
    Local(String),
}

// ---------------------------------------------------------------------------
// SpeechSynthesizer trait
// ---------------------------------------------------------------------------

/// Turns text into a base64 PCM16 payload.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<String, SpeechError>;
}

// ---------------------------------------------------------------------------
// GeminiSpeech
// ---------------------------------------------------------------------------

/// Speech synthesis through the configured TTS model.
pub struct GeminiSpeech {
    client: GeminiClient,
    model: String,
    voice: String,
}

impl GeminiSpeech {
    pub fn new(client: GeminiClient, model: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            voice: voice.into(),
        }
    }

    /// `generateContent` body requesting spoken audio of `text`.
    pub fn request_body(&self, text: &str) -> Value {
        json!({
            "contents": user_contents(text),
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": self.voice }
                    }
                }
            }
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for GeminiSpeech {
    /// A successful response without inline audio is reported as
    /// [`SpeechError::MissingAudio`]; callers treat it like any other failure.
    async fn synthesize(&self, text: &str) -> Result<String, SpeechError> {
        let response = self
            .client
            .generate_content(&self.model, &self.request_body(text))
            .await?;

        candidate_audio(&response)
            .map(str::to_string)
            .ok_or(SpeechError::MissingAudio)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
