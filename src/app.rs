//! Voice Cloner desktop window — egui/eframe application.
//!
//! # Architecture
//!
//! [`VoiceClonerApp`] is the top-level [`eframe::App`]. It owns the form
//! fields and talks to the rest of the crate through:
//!
//! * `command_tx` — sends [`SubmissionCommand`] to the orchestrator.
//! * `state`      — [`SharedState`], read every frame; never written here.
//! * `playback`   — [`PlaybackController`] behind the Play button.
//! * `fetcher`    — [`ArtifactFetcher`] behind the Download button.
//!
//! # Layout
//!
//! | Section | Contents |
//! |---------|----------|
//! | Reference | path field, Load button, drag-and-drop, duration hint |
//! | Language | Turkish / English selector |
//! | Text | multiline text area |
//! | Submit | "Generate Audio", disabled as "Generating Audio..." while busy |
//! | Error | inline message of the last failure |
//! | Result | artifact URL, Play, Download |

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use eframe::egui;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::audio::probe_wav;
use crate::config::AppConfig;
use crate::pipeline::{snapshot, SharedState, SubmissionCommand, SubmissionState};
use crate::playback::{ArtifactFetcher, PlaybackController};
use crate::synthesis::{
    ArtifactReference, HttpSubmitter, Language, ReferenceAudio, ServiceHealth, SynthesisInput,
    TransportError,
};

const SUBMIT_LABEL: &str = "Generate Audio";
const SUBMIT_BUSY_LABEL: &str = "Generating Audio...";
const REFERENCE_HINT: &str = "Upload a clean 5-10 second recording of the person's voice";

// ---------------------------------------------------------------------------
// HealthStatus
// ---------------------------------------------------------------------------

/// Result of the startup `GET /api/health` check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HealthStatus {
    #[default]
    Checking,
    Ready,
    ModelNotLoaded,
    Unreachable(String),
}

impl HealthStatus {
    pub fn from_check(reply: Result<ServiceHealth, TransportError>) -> Self {
        match reply {
            Ok(h) if h.is_ready() => HealthStatus::Ready,
            Ok(_) => HealthStatus::ModelNotLoaded,
            Err(e) => HealthStatus::Unreachable(e.to_string()),
        }
    }

    pub fn label(&self) -> String {
        match self {
            HealthStatus::Checking => "Checking service...".into(),
            HealthStatus::Ready => "Service ready".into(),
            HealthStatus::ModelNotLoaded => "Service up, model not loaded".into(),
            HealthStatus::Unreachable(e) => format!("Service unreachable: {e}"),
        }
    }

    fn color(&self) -> egui::Color32 {
        match self {
            HealthStatus::Checking => egui::Color32::from_rgb(140, 140, 140),
            HealthStatus::Ready => egui::Color32::from_rgb(80, 200, 120),
            HealthStatus::ModelNotLoaded => egui::Color32::from_rgb(230, 190, 80),
            HealthStatus::Unreachable(_) => egui::Color32::from_rgb(255, 136, 68),
        }
    }
}

/// Health status shared between the check task and the UI.
pub type SharedHealth = Arc<Mutex<HealthStatus>>;

/// Check the service once in the background.
pub fn spawn_health_check(runtime: &Handle, submitter: HttpSubmitter) -> SharedHealth {
    let health: SharedHealth = Arc::new(Mutex::new(HealthStatus::Checking));
    let slot = Arc::clone(&health);
    runtime.spawn(async move {
        let status = HealthStatus::from_check(submitter.health().await);
        log::info!("http: {}", status.label());
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = status;
    });
    health
}

// ---------------------------------------------------------------------------
// ReferenceField
// ---------------------------------------------------------------------------

/// The reference-audio part of the form.
#[derive(Debug, Default)]
struct ReferenceField {
    /// Path typed or dropped by the user.
    path: String,
    loaded: Option<ReferenceAudio>,
    /// Duration line for a loaded WAV, or the load error.
    note: Option<Result<String, String>>,
}

impl ReferenceField {
    fn load(&mut self, path: &Path) {
        self.path = path.display().to_string();
        match ReferenceAudio::from_path(path) {
            Ok(audio) => {
                self.note = Some(Ok(describe_reference(&audio)));
                log::info!("ui: loaded reference {} ({} bytes)", audio.file_name(), audio.len());
                self.loaded = Some(audio);
            }
            Err(e) => {
                log::warn!("ui: {e}");
                self.note = Some(Err(e.to_string()));
                self.loaded = None;
            }
        }
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// `"sample.wav · 6.2 s @ 16000 Hz"` for WAV files, the bare name otherwise.
fn describe_reference(audio: &ReferenceAudio) -> String {
    match probe_wav(audio.bytes()) {
        Ok(info) => format!(
            "{} · {:.1} s @ {} Hz",
            audio.file_name(),
            info.duration_secs,
            info.sample_rate
        ),
        Err(_) => audio.file_name().to_string(),
    }
}

// ---------------------------------------------------------------------------
// VoiceClonerApp
// ---------------------------------------------------------------------------

/// eframe application: the voice cloning form.
pub struct VoiceClonerApp {
    // ── Form ─────────────────────────────────────────────────────────────
    reference: ReferenceField,
    language: Language,
    text: String,

    // ── Submission ───────────────────────────────────────────────────────
    command_tx: mpsc::Sender<SubmissionCommand>,
    state: SharedState,

    // ── Artifact actions ─────────────────────────────────────────────────
    runtime: Handle,
    playback: PlaybackController,
    fetcher: ArtifactFetcher,
    download_dir: PathBuf,
    /// Outcome of the last download, written by the download task.
    download_notice: Arc<Mutex<Option<Result<String, String>>>>,
    downloading: Arc<AtomicBool>,
    /// URL of the artifact the result section currently shows.
    shown_result: Option<String>,

    health: SharedHealth,
}

impl VoiceClonerApp {
    /// Create a new [`VoiceClonerApp`].
    ///
    /// * `command_tx` — sender end of the submission command channel.
    /// * `state`      — shared submission state written by the orchestrator.
    /// * `runtime`    — tokio runtime used for downloads.
    /// * `config`     — loaded application configuration.
    pub fn new(
        command_tx: mpsc::Sender<SubmissionCommand>,
        state: SharedState,
        runtime: Handle,
        playback: PlaybackController,
        fetcher: ArtifactFetcher,
        health: SharedHealth,
        config: &AppConfig,
    ) -> Self {
        Self {
            reference: ReferenceField::default(),
            language: config.synthesis.default_language,
            text: String::new(),
            command_tx,
            state,
            runtime,
            playback,
            fetcher,
            download_dir: config.playback.resolved_download_dir(),
            download_notice: Arc::new(Mutex::new(None)),
            downloading: Arc::new(AtomicBool::new(false)),
            shown_result: None,
            health,
        }
    }

    // ── Actions ──────────────────────────────────────────────────────────

    /// Snapshot the form as a submission input.
    fn input(&self) -> SynthesisInput {
        SynthesisInput::new(
            self.text.clone(),
            self.reference.loaded.clone(),
            self.language,
        )
    }

    /// Queue the current form for submission.
    ///
    /// A typed path that has not been loaded yet is loaded first; if that
    /// fails the submission still goes out and fails validation.
    fn submit(&mut self) {
        if self.reference.loaded.is_none() && !self.reference.path.trim().is_empty() {
            let path = PathBuf::from(self.reference.path.trim());
            self.reference.load(&path);
        }
        if let Err(e) = self.command_tx.try_send(SubmissionCommand::Submit(self.input())) {
            log::warn!("ui: could not queue submission: {e}");
        }
    }

    fn play(&self, reference: &ArtifactReference) {
        self.playback.play(reference);
    }

    fn download(&self, reference: &ArtifactReference) {
        let fetcher = self.fetcher.clone();
        let reference = reference.clone();
        let dir = self.download_dir.clone();
        let notice = Arc::clone(&self.download_notice);
        let downloading = Arc::clone(&self.downloading);
        *notice.lock().unwrap_or_else(PoisonError::into_inner) = None;
        downloading.store(true, Ordering::SeqCst);

        self.runtime.spawn(async move {
            let outcome = match fetcher.download_to(&reference, &dir).await {
                Ok(path) => Ok(format!("Saved to {}", path.display())),
                Err(e) => {
                    log::error!("playback: download of {} failed: {e}", reference.file_id());
                    Err(e.to_string())
                }
            };
            *notice.lock().unwrap_or_else(PoisonError::into_inner) = Some(outcome);
            downloading.store(false, Ordering::SeqCst);
        });
    }

    /// Forget artifact actions that belong to a result no longer shown.
    fn sync_result(&mut self, state: &SubmissionState) {
        let current = state.result().map(|r| r.url().to_string());
        if current == self.shown_result {
            return;
        }
        if self.shown_result.is_some() {
            self.playback.stop();
        }
        *self
            .download_notice
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
        self.shown_result = current;
    }

    /// Load the first dropped file that has a path.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if let Some(path) = dropped.into_iter().find_map(|f| f.path) {
            self.reference.load(&path);
        }
    }

    // ── Section renderers ────────────────────────────────────────────────

    fn draw_header(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Voice Cloner");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let health = self
                    .health
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone();
                ui.label(
                    egui::RichText::new(health.label())
                        .color(health.color())
                        .size(11.0),
                );
            });
        });
    }

    fn draw_reference(&mut self, ui: &mut egui::Ui, busy: bool) {
        ui.label(egui::RichText::new("Reference audio").strong());
        ui.horizontal(|ui| {
            let width = (ui.available_width() - 110.0).max(120.0);
            let field = ui.add_enabled(
                !busy,
                egui::TextEdit::singleline(&mut self.reference.path)
                    .hint_text("Path to a voice sample, or drop a file here")
                    .desired_width(width),
            );
            if field.changed() {
                self.reference.loaded = None;
                self.reference.note = None;
            }
            if ui.add_enabled(!busy, egui::Button::new("Load")).clicked() {
                let path = PathBuf::from(self.reference.path.trim());
                self.reference.load(&path);
            }
            if ui.add_enabled(!busy, egui::Button::new("Clear")).clicked() {
                self.reference.clear();
            }
        });

        match &self.reference.note {
            Some(Ok(line)) => {
                ui.label(egui::RichText::new(line).color(egui::Color32::from_rgb(80, 200, 120)));
            }
            Some(Err(e)) => {
                ui.colored_label(egui::Color32::from_rgb(255, 136, 68), e);
            }
            None => {}
        }
        ui.label(
            egui::RichText::new(REFERENCE_HINT)
                .color(egui::Color32::from_rgb(140, 140, 140))
                .size(11.0),
        );
    }

    fn draw_language(&mut self, ui: &mut egui::Ui, busy: bool) {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Language").strong());
            ui.add_enabled_ui(!busy, |ui| {
                egui::ComboBox::from_id_salt("language")
                    .selected_text(self.language.label())
                    .show_ui(ui, |ui| {
                        for lang in Language::ALL {
                            ui.selectable_value(&mut self.language, lang, lang.label());
                        }
                    });
            });
        });
    }

    fn draw_text(&mut self, ui: &mut egui::Ui, busy: bool) {
        ui.label(egui::RichText::new("Text").strong());
        ui.add_enabled(
            !busy,
            egui::TextEdit::multiline(&mut self.text)
                .hint_text("Enter the text to synthesize")
                .desired_rows(6)
                .desired_width(f32::INFINITY),
        );
    }

    fn draw_submit(&mut self, ui: &mut egui::Ui, busy: bool) {
        ui.vertical_centered_justified(|ui| {
            let button = egui::Button::new(egui::RichText::new(submit_label(busy)).size(15.0))
                .min_size(egui::vec2(0.0, 32.0));
            if ui.add_enabled(!busy, button).clicked() {
                self.submit();
            }
        });
    }

    fn draw_error(&self, ui: &mut egui::Ui, state: &SubmissionState) {
        if let Some(message) = state.error_message() {
            egui::Frame::new()
                .fill(egui::Color32::from_rgb(70, 35, 30))
                .corner_radius(egui::CornerRadius::same(4))
                .inner_margin(egui::Margin::same(6))
                .show(ui, |ui| {
                    ui.colored_label(egui::Color32::from_rgb(255, 136, 68), message);
                });
        }
    }

    fn draw_result(&self, ui: &mut egui::Ui, state: &SubmissionState) {
        let Some(reference) = state.result() else {
            return;
        };

        ui.label(egui::RichText::new("Generated audio").strong());
        ui.hyperlink_to(reference.url(), reference.url());
        ui.horizontal(|ui| {
            if ui.button("Play").clicked() {
                self.play(reference);
            }
            if ui.button("Download").clicked() {
                self.download(reference);
            }
        });

        let notice = self
            .download_notice
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match notice {
            Some(Ok(line)) => {
                ui.label(egui::RichText::new(line).color(egui::Color32::from_rgb(140, 140, 140)));
            }
            Some(Err(e)) => {
                ui.colored_label(egui::Color32::from_rgb(255, 136, 68), e);
            }
            None => {}
        }
    }
}

/// Submit button caption for the given busy flag.
pub fn submit_label(busy: bool) -> &'static str {
    if busy {
        SUBMIT_BUSY_LABEL
    } else {
        SUBMIT_LABEL
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for VoiceClonerApp {
    /// Called every frame by eframe. Reads the submission state once, then
    /// renders the form from that snapshot.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let state = snapshot(&self.state);
        let busy = state.is_busy();
        self.sync_result(&state);

        if !busy {
            self.handle_dropped_files(ctx);
        }

        // Keep polling while a request, a download or the health check is outstanding.
        let checking = *self.health.lock().unwrap_or_else(PoisonError::into_inner)
            == HealthStatus::Checking;
        if busy || checking || self.downloading.load(Ordering::SeqCst) {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_header(ui);
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                self.draw_reference(ui, busy);
                ui.add_space(8.0);
                self.draw_language(ui, busy);
                ui.add_space(8.0);
                self.draw_text(ui, busy);
                ui.add_space(8.0);
                self.draw_submit(ui, busy);
                ui.add_space(8.0);
                self.draw_error(ui, &state);
                self.draw_result(ui, &state);
            });
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
