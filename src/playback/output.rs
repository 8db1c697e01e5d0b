//! Speaker output via `cpal`.
//!
//! [`CpalPlayer`] fetches an artifact on the tokio runtime, decodes it with
//! `hound`, converts it to the default output device's rate and channel
//! count, and plays it on a dedicated thread that owns the `cpal::Stream`.
//!
//! Each call to [`MediaPlayer::play`] bumps a generation counter; a playback
//! thread whose generation is stale stops its stream and exits, so only the
//! latest artifact is audible.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::runtime::Handle;

use crate::audio::{decode_wav, interleave, resample, DecodedAudio};
use crate::synthesis::ArtifactReference;

use super::{ArtifactFetcher, MediaPlayer, PlaybackError};

/// How often the playback thread checks for completion or replacement.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Default-output-device player.
pub struct CpalPlayer {
    runtime: Handle,
    fetcher: ArtifactFetcher,
    volume: f32,
    generation: Arc<AtomicU64>,
}

impl CpalPlayer {
    /// `volume` is expected in `[0.0, 1.0]`, see
    /// [`crate::config::PlaybackConfig::effective_volume`].
    pub fn new(runtime: Handle, fetcher: ArtifactFetcher, volume: f32) -> Self {
        Self {
            runtime,
            fetcher,
            volume,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Name of the default output device, if there is one.
    pub fn output_device_name() -> Option<String> {
        cpal::default_host()
            .default_output_device()
            .and_then(|d| d.name().ok())
    }
}

impl MediaPlayer for CpalPlayer {
    fn play(&self, reference: &ArtifactReference) -> Result<(), PlaybackError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = Arc::clone(&self.generation);
        let fetcher = self.fetcher.clone();
        let reference = reference.clone();
        let volume = self.volume;

        self.runtime.spawn(async move {
            let audio = match fetch_and_decode(&fetcher, &reference).await {
                Ok(audio) => audio,
                Err(e) => {
                    log::error!("playback: {}: {e}", reference.file_id());
                    return;
                }
            };
            if current.load(Ordering::SeqCst) != generation {
                log::debug!("playback: {} superseded before start", reference.file_id());
                return;
            }

            let file_id = reference.file_id().to_string();
            let spawned = std::thread::Builder::new()
                .name("playback".into())
                .spawn(move || {
                    if let Err(e) = play_blocking(audio, volume, &current, generation) {
                        log::error!("playback: {file_id}: {e}");
                    }
                });
            if let Err(e) = spawned {
                log::error!("playback: failed to spawn output thread: {e}");
            }
        });

        Ok(())
    }

    fn stop(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

async fn fetch_and_decode(
    fetcher: &ArtifactFetcher,
    reference: &ArtifactReference,
) -> Result<DecodedAudio, PlaybackError> {
    let bytes = fetcher.fetch(reference).await?;
    let audio = tokio::task::spawn_blocking(move || decode_wav(&bytes))
        .await
        .map_err(|e| PlaybackError::Unavailable(e.to_string()))??;
    log::info!(
        "playback: {} ({:.1}s @ {} Hz)",
        reference.file_id(),
        audio.duration_secs(),
        audio.sample_rate
    );
    Ok(audio)
}

/// Open the default output device and play `audio` until it finishes or
/// `current` moves past `generation`.
fn play_blocking(
    audio: DecodedAudio,
    volume: f32,
    current: &AtomicU64,
    generation: u64,
) -> Result<(), PlaybackError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(PlaybackError::NoDevice)?;

    let supported = device.default_output_config()?;
    let channels = supported.channels();
    let device_rate = supported.sample_rate().0;
    let config: cpal::StreamConfig = supported.into();

    let mono = resample(&audio.samples, audio.sample_rate, device_rate)?;
    let frames = interleave(&mono, channels, volume);

    let finished = Arc::new(AtomicBool::new(false));
    let finished_cb = Arc::clone(&finished);
    let mut cursor = 0usize;

    let stream = device.build_output_stream(
        &config,
        move |out: &mut [f32], _: &cpal::OutputCallbackInfo| {
            if fill_output(out, &frames, &mut cursor) {
                finished_cb.store(true, Ordering::SeqCst);
            }
        },
        |err: cpal::StreamError| {
            log::error!("playback: cpal stream error: {err}");
        },
        None,
    )?;
    stream.play()?;

    while !finished.load(Ordering::SeqCst) && current.load(Ordering::SeqCst) == generation {
        std::thread::sleep(POLL_INTERVAL);
    }
    // Let the last buffer drain before dropping the stream.
    std::thread::sleep(POLL_INTERVAL);
    Ok(())
}

/// Copy the next chunk of `source` into `out`, padding with silence.
///
/// Returns `true` once `source` is exhausted.
fn fill_output(out: &mut [f32], source: &[f32], cursor: &mut usize) -> bool {
    let start = (*cursor).min(source.len());
    let n = out.len().min(source.len() - start);
    out[..n].copy_from_slice(&source[start..start + n]);
    out[n..].fill(0.0);
    *cursor = start + n;
    *cursor >= source.len()
}
