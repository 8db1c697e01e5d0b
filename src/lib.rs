//! Voice Cloner — desktop client for a remote voice-cloning TTS service.
//!
//! The crate is split the same way the data flows:
//!
//! ```text
//! app (egui form) ──SubmissionCommand──▶ pipeline::SubmissionOrchestrator
//!                                          │ validate → encode → submit → interpret
//!                                          ▼
//!                                 pipeline::SharedState ◀── read every frame by app
//!
//! app ──Play──▶ playback::PlaybackController ──▶ dyn MediaPlayer (CpalPlayer)
//! ```

pub mod app;
pub mod audio;
pub mod config;
pub mod pipeline;
pub mod playback;
pub mod synthesis;
