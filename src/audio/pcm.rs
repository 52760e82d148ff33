//! Decoding of synthesized speech payloads.
//!
//! The speech model returns base64 text wrapping little-endian signed 16-bit
//! mono PCM.  [`decode_pcm16`] turns it into an [`AudioBuffer`] of `f32`
//! samples in `[-1.0, 1.0)`: each output sample is `i16 / 32768.0`.  No
//! resampling and no channel mixing happen here.

use base64::Engine as _;
use thiserror::Error;

/// Divisor mapping the full `i16` range onto `[-1.0, 1.0)`.
const PCM16_SCALE: f32 = 32_768.0;

// ---------------------------------------------------------------------------
// PcmError
// ---------------------------------------------------------------------------

/// Errors produced while decoding a PCM payload.
#[derive(Debug, Error)]
pub enum PcmError {
    /// The payload contained no audio bytes.
    #[error("PCM payload is empty")]
    Empty,

    /// The payload was not valid base64.
    #[error("PCM payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

// ---------------------------------------------------------------------------
// AudioBuffer
// ---------------------------------------------------------------------------

/// Decoded mono audio ready for playback.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Mono samples in `[-1.0, 1.0)`.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Playback length in seconds.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

// ---------------------------------------------------------------------------
// decode_pcm16
// ---------------------------------------------------------------------------

/// Decode base64 PCM16 (little-endian, mono) into an [`AudioBuffer`].
///
/// The output holds `bytes / 2` samples in input order.  A trailing odd byte
/// cannot form a sample and is dropped.
///
/// ```rust
/// use sound_safari::audio::decode_pcm16;
///
/// // 16384 (0x4000) followed by -32768 (0x8000)
/// let buf = decode_pcm16("AEAAgA==", 24_000).unwrap();
/// assert_eq!(buf.samples, vec![0.5, -1.0]);
/// assert_eq!(buf.sample_rate, 24_000);
/// ```
pub fn decode_pcm16(payload: &str, sample_rate: u32) -> Result<AudioBuffer, PcmError> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
    if bytes.len() < 2 {
        return Err(PcmError::Empty);
    }

    if bytes.len() % 2 != 0 {
        log::debug!("pcm: dropping trailing odd byte ({} bytes)", bytes.len());
    }

    let samples = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / PCM16_SCALE)
        .collect();

    Ok(AudioBuffer {
        samples,
        sample_rate,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
