//! Audio: speech payload decoding and speaker output.
//!
//! # Pipeline
//!
//! ```text
//! base64 PCM16 → decode_pcm16 → AudioBuffer (24 kHz mono f32)
//!             → AudioOutput (audio thread) → resample_linear → mono_to_interleaved
//!             → cpal output stream
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sound_safari::audio::{decode_pcm16, AudioOutput, AudioSink, OUTPUT_SAMPLE_RATE};
//!
//! # async fn example(payload: &str) {
//! let buffer = decode_pcm16(payload, OUTPUT_SAMPLE_RATE).unwrap();
//! let output = AudioOutput::shared();
//! output.resume().await.unwrap();
//! output.play(buffer).await.unwrap(); // resolves when playback has drained
//! # }
//! ```

pub mod output;
pub mod pcm;
pub mod resample;

pub use output::{
    AudioOutput, AudioSink, OutputError, OutputState, SharedOutput, OUTPUT_SAMPLE_RATE,
};
pub use pcm::{decode_pcm16, AudioBuffer, PcmError};
pub use resample::{mono_to_interleaved, resample_linear};
