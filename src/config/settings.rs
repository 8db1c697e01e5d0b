//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! Missing keys fall back to their defaults, so a partial `settings.toml`
//! still loads.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::synthesis::{Endpoint, EndpointError, Language};

// ---------------------------------------------------------------------------
// ServiceConfig
// ---------------------------------------------------------------------------

/// Where the synthesis service lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL; `/api/tts`, `/api/audio/{id}` and `/api/health` hang off it.
    pub endpoint_base: String,
    /// Per-request timeout. `None` waits for as long as the service takes,
    /// which is the right default for slow CPU synthesis.
    pub timeout_secs: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint_base: "http://localhost:5000".into(),
            timeout_secs: None,
        }
    }
}

impl ServiceConfig {
    /// Parse `endpoint_base`. Called once at startup.
    pub fn endpoint(&self) -> Result<Endpoint, EndpointError> {
        Endpoint::parse(&self.endpoint_base)
    }

    /// HTTP client shared by submission, health checks and downloads.
    ///
    /// Without `timeout_secs` the client waits indefinitely, so a hung
    /// service keeps the submission in flight until it answers.
    pub fn http_client(&self) -> reqwest::Client {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build().unwrap_or_else(|e| {
            log::warn!("http: client builder failed ({e}); using defaults");
            reqwest::Client::new()
        })
    }
}

// ---------------------------------------------------------------------------
// SynthesisConfig
// ---------------------------------------------------------------------------

/// Form defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Language preselected in the form.
    pub default_language: Language,
}

// ---------------------------------------------------------------------------
// PlaybackConfig
// ---------------------------------------------------------------------------

/// Playback and download settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Where "Download" saves artifacts. `None` uses [`AppPaths::downloads_dir`].
    pub download_dir: Option<PathBuf>,
    /// Output gain applied during playback (0.0 – 1.0).
    pub volume: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            download_dir: None,
            volume: 1.0,
        }
    }
}

impl PlaybackConfig {
    /// Configured download directory, or the platform default.
    pub fn resolved_download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .unwrap_or_else(|| AppPaths::new().downloads_dir)
    }

    /// Volume clamped to the valid range.
    pub fn effective_volume(&self) -> f32 {
        if self.volume.is_nan() {
            1.0
        } else {
            self.volume.clamp(0.0, 1.0)
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// eframe window settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Initial inner window size `(width, height)` in points.
    pub window_size: (f32, f32),
    /// Keep the window above all other windows.
    pub always_on_top: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_size: (520.0, 640.0),
            always_on_top: false,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use voice_cloner::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// let client = config.service.http_client();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Synthesis service connection.
    pub service: ServiceConfig,
    /// Form defaults.
    pub synthesis: SynthesisConfig,
    /// Playback / download settings.
    pub playback: PlaybackConfig,
    /// Window settings.
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
