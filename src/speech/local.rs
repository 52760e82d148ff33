//! Offline speech through a local command-line synthesizer.
//!
//! [`CommandVoice`] runs `espeak-ng` (or `espeak`) with a voice code and a
//! words-per-minute rate, or macOS `say` with a rate.  The text is written to
//! the program's stdin, never passed as an argument.  The call resolves when
//! the process exits, i.e. when speaking has finished.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::speech::synth::SpeechError;

/// Normal speaking rate in words per minute (espeak and `say` default).
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// Floor for the computed rate; slower than this becomes unintelligible.
const MIN_WORDS_PER_MINUTE: u32 = 80;

/// Convert a rate multiplier into words per minute.
///
/// ```rust
/// use sound_safari::speech::words_per_minute;
///
/// assert_eq!(words_per_minute(1.0), 175);
/// assert_eq!(words_per_minute(0.8), 140);
/// ```
pub fn words_per_minute(rate: f32) -> u32 {
    ((BASE_WORDS_PER_MINUTE * rate).round() as u32).max(MIN_WORDS_PER_MINUTE)
}

// ---------------------------------------------------------------------------
// LocalVoice trait
// ---------------------------------------------------------------------------

/// Offline text-to-speech that resolves once speaking ends.
#[async_trait]
pub trait LocalVoice: Send + Sync {
    /// Speak `text` in `language` (BCP-47 tag) at `rate` × normal speed.
    async fn speak(&self, text: &str, language: &str, rate: f32) -> Result<(), SpeechError>;
}

// ---------------------------------------------------------------------------
// CommandVoice
// ---------------------------------------------------------------------------

/// [`LocalVoice`] backed by an external program.
pub struct CommandVoice {
    program: String,
}

impl CommandVoice {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn is_say(&self) -> bool {
        std::path::Path::new(&self.program)
            .file_stem()
            .is_some_and(|stem| stem == "say")
    }

    /// Arguments passed to the program.  Both programs read the text from
    /// stdin.
    pub fn args(&self, language: &str, rate: f32) -> Vec<String> {
        let wpm = words_per_minute(rate).to_string();
        if self.is_say() {
            vec!["-r".into(), wpm, "-f".into(), "-".into()]
        } else {
            vec![
                "-v".into(),
                language.to_ascii_lowercase(),
                "-s".into(),
                wpm,
                "--stdin".into(),
            ]
        }
    }
}

#[async_trait]
impl LocalVoice for CommandVoice {
    async fn speak(&self, text: &str, language: &str, rate: f32) -> Result<(), SpeechError> {
        log::debug!("local voice: {} ({language}, rate {rate})", self.program);

        let mut child = tokio::process::Command::new(&self.program)
            .args(self.args(language, rate))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SpeechError::Local(format!("{}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|e| SpeechError::Local(format!("{}: writing text: {e}", self.program)))?;
            // EOF
            drop(stdin);
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| SpeechError::Local(format!("{}: {e}", self.program)))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(SpeechError::Local(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
