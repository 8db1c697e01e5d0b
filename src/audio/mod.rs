//! Audio helpers: WAV decoding and playback conversion.
//!
//! # Pipeline
//!
//! ```text
//! artifact bytes → decode_wav (mono f32) → resample (device rate)
//!               → interleave (device channels, gain) → cpal output stream
//! ```

pub mod decode;
pub mod resample;

pub use decode::{decode_wav, probe_wav, DecodeError, DecodedAudio, WavInfo};
pub use resample::{downmix, interleave, resample, ResampleError};
