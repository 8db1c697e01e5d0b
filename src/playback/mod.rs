//! Playback of synthesized artifacts.
//!
//! [`MediaPlayer`] is the capability the UI plays through;
//! [`PlaybackController`] wraps one and swallows its failures after logging
//! them. Failures are never retried and never touch submission state.
//!
//! [`CpalPlayer`] is the speaker implementation; [`ArtifactFetcher`] also
//! backs the Download button.

pub mod fetch;
pub mod output;

use std::sync::Arc;

use thiserror::Error;

use crate::audio::{DecodeError, ResampleError};
use crate::synthesis::ArtifactReference;

pub use fetch::{ArtifactFetcher, FetchError};
pub use output::CpalPlayer;

// ---------------------------------------------------------------------------
// PlaybackError
// ---------------------------------------------------------------------------

/// Errors that can occur while playing an artifact.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("failed to fetch audio: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to decode audio: {0}")]
    Decode(#[from] DecodeError),

    #[error("failed to resample audio: {0}")]
    Resample(#[from] ResampleError),

    #[error("no output device found on the default audio host")]
    NoDevice,

    #[error("failed to query default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("player unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// MediaPlayer
// ---------------------------------------------------------------------------

/// Something that can play the audio behind an [`ArtifactReference`].
///
/// `play` must return promptly; long-running work belongs on a background
/// task. Must be `Send + Sync` so it can sit behind `Arc<dyn MediaPlayer>`.
pub trait MediaPlayer: Send + Sync {
    fn play(&self, reference: &ArtifactReference) -> Result<(), PlaybackError>;

    /// Silence whatever is playing. A no-op when idle.
    fn stop(&self);
}

// ---------------------------------------------------------------------------
// PlaybackController
// ---------------------------------------------------------------------------

/// Forwards play requests to a [`MediaPlayer`].
#[derive(Clone)]
pub struct PlaybackController {
    player: Arc<dyn MediaPlayer>,
}

impl PlaybackController {
    pub fn new(player: Arc<dyn MediaPlayer>) -> Self {
        Self { player }
    }

    /// Ask the player to play `reference`.
    ///
    /// Returns whether the player accepted the request. A refusal is logged
    /// and dropped.
    pub fn play(&self, reference: &ArtifactReference) -> bool {
        match self.player.play(reference) {
            Ok(()) => {
                log::info!("playback: playing {}", reference.url());
                true
            }
            Err(e) => {
                log::warn!("playback: could not play {}: {e}", reference.url());
                false
            }
        }
    }

    /// Silence the player, e.g. when the artifact it plays is replaced.
    pub fn stop(&self) {
        self.player.stop();
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::synthesis::Endpoint;

    #[derive(Default)]
    struct Recording {
        played: Mutex<Vec<String>>,
        stops: AtomicUsize,
    }

    impl MediaPlayer for Recording {
        fn play(&self, reference: &ArtifactReference) -> Result<(), PlaybackError> {
            self.played.lock().unwrap().push(reference.url().to_string());
            Ok(())
        }

        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct Broken {
        calls: AtomicUsize,
    }

    impl MediaPlayer for Broken {
        fn play(&self, _reference: &ArtifactReference) -> Result<(), PlaybackError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(PlaybackError::NoDevice)
        }

        fn stop(&self) {}
    }

    fn reference(id: &str) -> ArtifactReference {
        let endpoint = Endpoint::parse("http://localhost:5000").unwrap();
        ArtifactReference::new(&endpoint, id)
    }

    #[test]
    fn forwards_reference_url() {
        let player = Arc::new(Recording::default());
        let controller = PlaybackController::new(player.clone());

        assert!(controller.play(&reference("abc")));
        assert!(controller.play(&reference("def")));

        let played = player.played.lock().unwrap();
        assert_eq!(
            *played,
            vec![
                "http://localhost:5000/api/audio/abc".to_string(),
                "http://localhost:5000/api/audio/def".to_string(),
            ]
        );
    }

    #[test]
    fn stop_is_forwarded() {
        let player = Arc::new(Recording::default());
        let controller = PlaybackController::new(player.clone());

        controller.play(&reference("abc"));
        controller.stop();
        assert_eq!(player.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failure_is_reported_once_and_not_retried() {
        let player = Arc::new(Broken::default());
        let controller = PlaybackController::new(player.clone());

        assert!(!controller.play(&reference("abc")));
        assert_eq!(player.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            PlaybackError::NoDevice.to_string(),
            "no output device found on the default audio host"
        );
        let nf = PlaybackError::from(FetchError::NotFound {
            message: "Audio file not found".into(),
        });
        assert_eq!(nf.to_string(), "failed to fetch audio: Audio file not found");

        let rate = PlaybackError::from(ResampleError::Rate {
            from_rate: 0,
            to_rate: 48_000,
        });
        assert_eq!(
            rate.to_string(),
            "failed to resample audio: cannot resample from 0 Hz to 48000 Hz"
        );
    }
}
