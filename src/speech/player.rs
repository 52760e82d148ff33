//! Speech playback adapter: remote voice first, offline voice on failure.
//!
//! ```text
//! SpeechPlayer::speak(text)
//!   ├─ ensure output Running (resume if Suspended)
//!   ├─ SpeechSynthesizer::synthesize → base64 PCM16
//!   ├─ decode_pcm16 @ sample_rate
//!   ├─ AudioSink::play (await drain)                  → Remote
//!   └─ any error above → LocalVoice::speak @ 0.8×     → Local
//!                          └─ error                   → Failed
//! ```
//!
//! `speak` never returns an error; [`PlaybackOutcome::Failed`] is the only
//! signal the game reacts to.

use std::sync::Arc;

use async_trait::async_trait;

use crate::audio::{decode_pcm16, AudioSink, OutputState, SharedOutput};
use crate::config::SpeechConfig;
use crate::gemini::GeminiClient;
use crate::speech::local::{CommandVoice, LocalVoice};
use crate::speech::synth::{GeminiSpeech, SpeechError, SpeechSynthesizer};

// ---------------------------------------------------------------------------
// PlaybackOutcome
// ---------------------------------------------------------------------------

/// How a `speak` call ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackOutcome {
    /// Synthesized speech played through the audio output.
    Remote,
    /// The offline voice read the text.
    Local,
    /// Neither voice worked.
    Failed(String),
}

impl PlaybackOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, PlaybackOutcome::Failed(_))
    }
}

// ---------------------------------------------------------------------------
// SpeechOutput trait
// ---------------------------------------------------------------------------

/// What the game needs from speech: say this, tell me when you're done.
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    async fn speak(&self, text: &str) -> PlaybackOutcome;
}

// ---------------------------------------------------------------------------
// SpeechPlayer
// ---------------------------------------------------------------------------

/// Production [`SpeechOutput`].
pub struct SpeechPlayer {
    synth: Arc<dyn SpeechSynthesizer>,
    sink: Arc<dyn AudioSink>,
    local: Arc<dyn LocalVoice>,
    config: SpeechConfig,
}

impl SpeechPlayer {
    pub fn new(
        synth: Arc<dyn SpeechSynthesizer>,
        sink: Arc<dyn AudioSink>,
        local: Arc<dyn LocalVoice>,
        config: SpeechConfig,
    ) -> Self {
        Self {
            synth,
            sink,
            local,
            config,
        }
    }

    /// Remote speech on the shared audio output, `config.local_program` as
    /// the offline voice.
    pub fn from_config(
        client: GeminiClient,
        speech_model: &str,
        voice: &str,
        config: &SpeechConfig,
    ) -> Self {
        Self::new(
            Arc::new(GeminiSpeech::new(client, speech_model, voice)),
            Arc::new(SharedOutput),
            Arc::new(CommandVoice::new(&config.local_program)),
            config.clone(),
        )
    }

    async fn play_remote(&self, text: &str) -> Result<(), SpeechError> {
        if self.sink.state() == OutputState::Suspended {
            self.sink.resume().await?;
        }

        let payload = self.synth.synthesize(text).await?;
        let buffer = decode_pcm16(&payload, self.config.sample_rate)?;
        log::debug!("speech: playing {:.1}s of audio", buffer.duration_secs());

        self.sink.play(buffer).await?;
        Ok(())
    }
}

#[async_trait]
impl SpeechOutput for SpeechPlayer {
    async fn speak(&self, text: &str) -> PlaybackOutcome {
        let err = match self.play_remote(text).await {
            Ok(()) => return PlaybackOutcome::Remote,
            Err(err) => err,
        };

        log::warn!("speech: remote voice failed ({err}); using offline voice");

        match self
            .local
            .speak(text, &self.config.language, self.config.fallback_rate)
            .await
        {
            Ok(()) => PlaybackOutcome::Local,
            Err(local_err) => {
                log::error!("speech: offline voice failed: {local_err}");
                PlaybackOutcome::Failed(local_err.to_string())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use base64::Engine as _;

    use crate::audio::{AudioBuffer, OutputError};
    use crate::gemini::GeminiError;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    enum SynthReply {
        Payload(String),
        Missing,
        Timeout,
    }

    struct MockSynth(SynthReply);

    #[async_trait]
    impl SpeechSynthesizer for MockSynth {
        async fn synthesize(&self, _text: &str) -> Result<String, SpeechError> {
            match &self.0 {
                SynthReply::Payload(p) => Ok(p.clone()),
                SynthReply::Missing => Err(SpeechError::MissingAudio),
                SynthReply::Timeout => Err(SpeechError::Remote(GeminiError::Timeout)),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        running: Mutex<bool>,
        resumes: Mutex<u32>,
        played: Mutex<Vec<AudioBuffer>>,
        fail_play: bool,
    }

    #[async_trait]
    impl AudioSink for RecordingSink {
        fn state(&self) -> OutputState {
            if *self.running.lock().unwrap() {
                OutputState::Running
            } else {
                OutputState::Suspended
            }
        }

        async fn resume(&self) -> Result<(), OutputError> {
            *self.resumes.lock().unwrap() += 1;
            *self.running.lock().unwrap() = true;
            Ok(())
        }

        async fn play(&self, buffer: AudioBuffer) -> Result<(), OutputError> {
            if self.fail_play {
                return Err(OutputError::NoDevice);
            }
            self.played.lock().unwrap().push(buffer);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockLocal {
        calls: Mutex<Vec<(String, String, f32)>>,
        fail: bool,
    }

    #[async_trait]
    impl LocalVoice for MockLocal {
        async fn speak(&self, text: &str, language: &str, rate: f32) -> Result<(), SpeechError> {
            self.calls
                .lock()
                .unwrap()
                .push((text.into(), language.into(), rate));
            if self.fail {
                Err(SpeechError::Local("no speech program".into()))
            } else {
                Ok(())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn payload(samples: &[i16]) -> String {
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    fn player(
        reply: SynthReply,
        sink: Arc<RecordingSink>,
        local: Arc<MockLocal>,
    ) -> SpeechPlayer {
        SpeechPlayer::new(
            Arc::new(MockSynth(reply)),
            sink,
            local,
            SpeechConfig::default(),
        )
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn remote_audio_is_decoded_and_played() {
        let sink = Arc::new(RecordingSink::default());
        let local = Arc::new(MockLocal::default());
        let p = player(
            SynthReply::Payload(payload(&[16_384, -32_768])),
            Arc::clone(&sink),
            Arc::clone(&local),
        );

        assert_eq!(p.speak("I say Moo!").await, PlaybackOutcome::Remote);

        let played = sink.played.lock().unwrap();
        assert_eq!(played.len(), 1);
        assert_eq!(played[0].samples, vec![0.5, -1.0]);
        assert_eq!(played[0].sample_rate, 24_000);
        assert!(local.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn suspended_output_is_resumed_once() {
        let sink = Arc::new(RecordingSink::default());
        let p = player(
            SynthReply::Payload(payload(&[1, 2])),
            Arc::clone(&sink),
            Arc::new(MockLocal::default()),
        );

        p.speak("one").await;
        p.speak("two").await;

        assert_eq!(*sink.resumes.lock().unwrap(), 1);
        assert_eq!(sink.played.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_audio_falls_back_to_slow_local_voice() {
        let local = Arc::new(MockLocal::default());
        let p = player(
            SynthReply::Missing,
            Arc::new(RecordingSink::default()),
            Arc::clone(&local),
        );

        assert_eq!(p.speak("I say Quack!").await, PlaybackOutcome::Local);

        let calls = local.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "I say Quack!");
        assert_eq!(calls[0].1, "en-US");
        assert!((calls[0].2 - 0.8).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn transport_error_falls_back() {
        let p = player(
            SynthReply::Timeout,
            Arc::new(RecordingSink::default()),
            Arc::new(MockLocal::default()),
        );
        assert_eq!(p.speak("Hiss!").await, PlaybackOutcome::Local);
    }

    #[tokio::test]
    async fn undecodable_payload_falls_back() {
        let p = player(
            SynthReply::Payload("%%%".into()),
            Arc::new(RecordingSink::default()),
            Arc::new(MockLocal::default()),
        );
        assert_eq!(p.speak("Tweet!").await, PlaybackOutcome::Local);
    }

    #[tokio::test]
    async fn device_failure_falls_back() {
        let sink = Arc::new(RecordingSink {
            fail_play: true,
            ..RecordingSink::default()
        });
        let p = player(
            SynthReply::Payload(payload(&[1, 2, 3])),
            sink,
            Arc::new(MockLocal::default()),
        );
        assert_eq!(p.speak("Woof!").await, PlaybackOutcome::Local);
    }

    #[tokio::test]
    async fn both_voices_failing_reports_failure() {
        let local = Arc::new(MockLocal {
            fail: true,
            ..MockLocal::default()
        });
        let p = player(SynthReply::Missing, Arc::new(RecordingSink::default()), local);

        let outcome = p.speak("Roar!").await;
        assert!(outcome.is_failure());
    }
}
