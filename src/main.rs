//! Application entry point — Voice Cloner.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime.
//! 4. Parse the service endpoint and build the shared HTTP client.
//! 5. Spawn the submission orchestrator on the runtime.
//! 6. Check the service health in the background.
//! 7. Build the cpal player for the Play button.
//! 8. Run [`eframe::run_native`], which blocks the main thread until the window
//!    is closed.

use std::sync::Arc;

use anyhow::Context;
use eframe::egui;
use tokio::sync::mpsc;
use voice_cloner::{
    app::{spawn_health_check, VoiceClonerApp},
    config::AppConfig,
    pipeline::{new_shared_state, SubmissionCommand, SubmissionOrchestrator},
    playback::{ArtifactFetcher, CpalPlayer, PlaybackController},
    synthesis::HttpSubmitter,
};

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (width, height) = config.ui.window_size;
    let mut vp = egui::ViewportBuilder::default()
        .with_title("Voice Cloner")
        .with_inner_size([width, height])
        .with_min_inner_size([360.0, 420.0])
        .with_drag_and_drop(true);

    if config.ui.always_on_top {
        vp = vp.with_always_on_top();
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Voice Cloner starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 4. Endpoint + transport
    let endpoint = config
        .service
        .endpoint()
        .with_context(|| format!("invalid service.endpoint_base {:?}", config.service.endpoint_base))?;
    log::info!("Synthesis service: {endpoint}");

    let client = config.service.http_client();
    let submitter = HttpSubmitter::new(client.clone(), endpoint.clone());

    // 5. Orchestrator
    let state = new_shared_state();
    let (command_tx, command_rx) = mpsc::channel::<SubmissionCommand>(16);
    let orchestrator = Arc::new(SubmissionOrchestrator::new(
        Arc::clone(&state),
        Arc::new(submitter.clone()),
        endpoint,
    ));
    rt.spawn(orchestrator.run(command_rx));

    // 6. Health check
    let health = spawn_health_check(rt.handle(), submitter);

    // 7. Playback
    let fetcher = ArtifactFetcher::new(client);
    match CpalPlayer::output_device_name() {
        Some(name) => log::info!("Audio output: {name}"),
        None => log::warn!("No audio output device; Play will fail"),
    }
    let player = CpalPlayer::new(
        rt.handle().clone(),
        fetcher.clone(),
        config.playback.effective_volume(),
    );
    let playback = PlaybackController::new(Arc::new(player));

    // 8. Build the egui app and run it (blocks until the window is closed)
    let app = VoiceClonerApp::new(
        command_tx,
        state,
        rt.handle().clone(),
        playback,
        fetcher,
        health,
        &config,
    );
    let options = native_options(&config);

    eframe::run_native(
        "Voice Cloner",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("UI error: {e}"))?;

    log::info!("Voice Cloner shutting down");
    Ok(())
}
