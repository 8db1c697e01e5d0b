//! WAV decoding with `hound`.
//!
//! The service returns `audio/wav`; reference samples are usually WAV too.
//! [`probe_wav`] reads only the header, [`decode_wav`] reads all samples and
//! normalises them to mono `f32` in `[-1.0, 1.0]`.

use std::io::Cursor;

use hound::{SampleFormat, WavReader};
use thiserror::Error;

use super::downmix;

/// Errors that can occur while reading WAV data.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("not a readable WAV stream: {0}")]
    Wav(#[from] hound::Error),

    #[error("unsupported sample width: {0} bits")]
    SampleWidth(u16),

    #[error("WAV stream contains no samples")]
    Empty,
}

/// Header facts about a WAV stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_secs: f32,
}

/// Decoded mono audio.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Mono samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Read the header of an in-memory WAV file.
pub fn probe_wav(bytes: &[u8]) -> Result<WavInfo, DecodeError> {
    let reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    // `duration()` counts frames, i.e. samples per channel.
    let frames = reader.duration();
    let duration_secs = if spec.sample_rate == 0 {
        0.0
    } else {
        frames as f32 / spec.sample_rate as f32
    };
    Ok(WavInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        duration_secs,
    })
}

/// Decode an in-memory WAV file to mono `f32`.
pub fn decode_wav(bytes: &[u8]) -> Result<DecodedAudio, DecodeError> {
    let reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let bits = spec.bits_per_sample;
            if bits == 0 || bits > 32 {
                return Err(DecodeError::SampleWidth(bits));
            }
            let scale = (1i64 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    let samples = downmix(&interleaved, spec.channels);
    if samples.is_empty() {
        return Err(DecodeError::Empty);
    }

    Ok(DecodedAudio {
        samples,
        sample_rate: spec.sample_rate,
    })
}
