//! Device-rate adaptation for decoded speech.
//!
//! Synthesized speech arrives as 24 kHz mono.  When the output device cannot
//! open a 24 kHz mono stream, the buffer is converted on the audio thread:
//!
//! 1. [`resample_linear`]: resample to the device rate.
//! 2. [`mono_to_interleaved`]: copy each frame into every device channel.

// ---------------------------------------------------------------------------
// mono_to_interleaved
// ---------------------------------------------------------------------------

/// Expand mono samples to `channels` interleaved channels by duplicating each
/// sample.
///
/// * `channels == 1` returns the input unchanged.
/// * `channels == 0` returns an empty vector.
///
/// ```rust
/// use sound_safari::audio::mono_to_interleaved;
///
/// let stereo = mono_to_interleaved(&[0.25, -0.5], 2);
/// assert_eq!(stereo, vec![0.25, 0.25, -0.5, -0.5]);
/// ```
pub fn mono_to_interleaved(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            let mut out = Vec::with_capacity(samples.len() * n);
            for &s in samples {
                out.extend(std::iter::repeat(s).take(n));
            }
            out
        }
    }
}

// ---------------------------------------------------------------------------
// resample_linear
// ---------------------------------------------------------------------------

/// Resample mono `samples` from `source_rate` to `target_rate` Hz using linear
/// interpolation.
///
/// * Equal rates return the input unchanged.
/// * Empty input (or a zero rate) returns an empty vector.
///
/// The output length is `ceil(samples.len() * target_rate / source_rate)`.
///
/// ```rust
/// use sound_safari::audio::resample_linear;
///
/// // 24 kHz → 48 kHz doubles the length
/// let out = resample_linear(&[0.5_f32; 240], 24_000, 48_000);
/// assert_eq!(out.len(), 480);
/// ```
pub fn resample_linear(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if source_rate == target_rate {
        return samples.to_vec();
    }

    if samples.is_empty() || source_rate == 0 || target_rate == 0 {
        return Vec::new();
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let output_len = (samples.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 / ratio;
        let idx = src_pos as usize;
        let frac = (src_pos - idx as f64) as f32;

        let sample = if idx + 1 < samples.len() {
            samples[idx] * (1.0 - frac) + samples[idx + 1] * frac
        } else if idx < samples.len() {
            samples[idx]
        } else {
            0.0
        };

        output.push(sample);
    }

    output
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
