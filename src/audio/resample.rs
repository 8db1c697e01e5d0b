//! Sample-rate and channel conversion for playback.
//!
//! Synthesized audio arrives at whatever rate the service's vocoder uses
//! (YourTTS emits 16 kHz mono), while output devices usually run at 44.1 or
//! 48 kHz with two channels. Playback therefore goes:
//!
//! 1. [`downmix`] — interleaved N-channel → mono.
//! 2. [`resample`] — mono at the source rate → mono at the device rate.
//! 3. [`interleave`] — mono → interleaved device channels, with gain applied.
//!
//! Resampling uses `rubato`'s `FastFixedIn` with cubic interpolation, one
//! channel, fed in fixed-size chunks.

use rubato::{FastFixedIn, PolynomialDegree, Resampler};
use thiserror::Error;

/// Input frames handed to the resampler per call.
const CHUNK_FRAMES: usize = 1024;

/// Errors that can occur while resampling.
#[derive(Debug, Error)]
pub enum ResampleError {
    #[error("cannot resample from {from_rate} Hz to {to_rate} Hz")]
    Rate { from_rate: u32, to_rate: u32 },

    #[error("failed to create resampler: {0}")]
    Construction(#[from] rubato::ResamplerConstructionError),

    #[error("resampling failed: {0}")]
    Process(#[from] rubato::ResampleError),
}

/// Average interleaved channels down to mono.
///
/// `channels == 0` yields an empty vector; `channels == 1` is a plain copy.
///
/// ```rust
/// use voice_cloner::audio::downmix;
///
/// let stereo = vec![0.5_f32, -0.5, 0.2, 0.4]; // L R L R
/// let mono = downmix(&stereo, 2);
/// assert_eq!(mono.len(), 2);
/// assert!((mono[0] - 0.0).abs() < 1e-6);
/// assert!((mono[1] - 0.3).abs() < 1e-6);
/// ```
pub fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

/// Resample mono `samples` from `from_rate` to `to_rate` Hz with `rubato`.
///
/// Equal rates or an empty input return the input unchanged. The output has
/// `ceil(len * to_rate / from_rate)` samples, with the resampler's filter
/// delay removed.
///
/// ```rust
/// use voice_cloner::audio::resample;
///
/// let speech_16k = vec![0.25_f32; 160]; // 10 ms
/// let device_48k = resample(&speech_16k, 16_000, 48_000).unwrap();
/// assert_eq!(device_48k.len(), 480);
/// ```
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, ResampleError> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    if from_rate == 0 || to_rate == 0 {
        return Err(ResampleError::Rate { from_rate, to_rate });
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let mut resampler = FastFixedIn::<f32>::new(
        ratio,
        1.0, // fixed ratio
        PolynomialDegree::Cubic,
        CHUNK_FRAMES,
        1,
    )?;

    let expected = (samples.len() as f64 * ratio).ceil() as usize;
    let delay = resampler.output_delay();
    let mut output = Vec::with_capacity(expected + delay);

    let mut pos = 0;
    while samples.len() - pos >= resampler.input_frames_next() {
        let end = pos + resampler.input_frames_next();
        let frames: [&[f32]; 1] = [&samples[pos..end]];
        let chunk = resampler.process(&frames[..], None)?;
        output.extend_from_slice(&chunk[0]);
        pos = end;
    }
    if pos < samples.len() {
        let tail: [&[f32]; 1] = [&samples[pos..]];
        let chunk = resampler.process_partial(Some(&tail[..]), None)?;
        output.extend_from_slice(&chunk[0]);
    }

    // Flush the filter so the delayed tail comes out.
    while output.len() < expected + delay {
        let chunk = resampler.process_partial(None::<&[&[f32]]>, None)?;
        if chunk[0].is_empty() {
            break;
        }
        output.extend_from_slice(&chunk[0]);
    }

    output.drain(..delay.min(output.len()));
    output.truncate(expected);
    Ok(output)
}

/// Duplicate mono samples across `channels`, scaling by `gain`.
///
/// Output values are clamped to `[-1.0, 1.0]`.
pub fn interleave(mono: &[f32], channels: u16, gain: f32) -> Vec<f32> {
    let channels = channels.max(1) as usize;
    let mut out = Vec::with_capacity(mono.len() * channels);
    for &s in mono {
        let v = (s * gain).clamp(-1.0, 1.0);
        out.extend(std::iter::repeat(v).take(channels));
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
