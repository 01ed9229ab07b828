//! Configuration management.
//!
//! The config file is JSON. Every field has a default, so a partial file (or
//! no file at all) is valid.

use crate::error::StoreError;
use crate::persistence::{default_browser_profile_dir, default_config_path, default_output_dir};
use rosterwalk_walk::{ConnectOptions, Jitter, Selectors, WalkSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

// ============================================================================
// Config Types
// ============================================================================

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,
    /// How to reach a browser.
    pub browser: BrowserConfig,
    /// Traversal timings and thresholds.
    pub walk: WalkConfig,
    /// DOM selectors of the target application.
    pub selectors: Selectors,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    Warn,
    /// Info level logging.
    #[default]
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level.
    pub log_level: LogLevel,
    /// Where output documents are written.
    pub output_dir: Option<PathBuf>,
}

impl GeneralConfig {
    /// Output directory, falling back to the platform default.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(default_output_dir)
    }
}

/// Browser connection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// DevTools websocket URL of a running, signed-in browser.
    pub devtools_url: Option<String>,
    /// Profile directory used when launching Chrome.
    pub user_data_dir: Option<PathBuf>,
    /// Chrome executable used when launching.
    pub chrome_executable: Option<PathBuf>,
    /// Launch without a window.
    pub headless: bool,
}

impl BrowserConfig {
    /// Connect options: attach if a DevTools URL is set, otherwise launch.
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            devtools_url: self.devtools_url.clone(),
            user_data_dir: Some(
                self.user_data_dir
                    .clone()
                    .unwrap_or_else(default_browser_profile_dir),
            ),
            chrome_executable: self.chrome_executable.clone(),
            headless: self.headless,
        }
    }
}

/// Traversal timings and thresholds, in milliseconds and pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Origin of the web client.
    pub origin: String,
    /// Page navigation bound.
    pub navigation_timeout_ms: u64,
    /// Member list appearance bound.
    pub list_timeout_ms: u64,
    /// First row appearance bound.
    pub first_row_timeout_ms: u64,
    /// Overlay appearance bound per click.
    pub overlay_timeout_ms: u64,
    /// Profile page appearance bound.
    pub profile_timeout_ms: u64,
    /// Clicks per row before the overlay is given up on.
    pub click_attempts: u32,
    /// Fixed part of the pause after hovering.
    pub hover_pause_ms: u64,
    /// Random part of the pause after hovering.
    pub hover_jitter_ms: u64,
    /// Fixed part of the pause after dismissing the overlay.
    pub settle_pause_ms: u64,
    /// Random part of the pause after dismissing the overlay.
    pub settle_jitter_ms: u64,
    /// Pixels per incremental scroll.
    pub scroll_step_px: i64,
    /// Fixed part of the pause after scrolling.
    pub scroll_pause_ms: u64,
    /// Random part of the pause after scrolling.
    pub scroll_jitter_ms: u64,
    /// Successes between scroll-into-view hints; 0 disables them.
    pub hint_every: u32,
    /// Pause after a scroll-into-view hint.
    pub hint_pause_ms: u64,
    /// Consecutive failures that end the run at the bottom of the list.
    pub failure_threshold: u32,
    /// Consecutive failures that end the run anywhere; 0 disables the limit.
    pub failure_ceiling: u32,
    /// Distance from the scroll maximum that counts as the bottom.
    pub bottom_margin_px: f64,
    /// Key that dismisses the overlay.
    pub dismiss_key: String,
    /// Index to start at.
    pub start_index: u32,
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Default for WalkConfig {
    fn default() -> Self {
        let s = WalkSettings::default();
        Self {
            origin: s.origin,
            navigation_timeout_ms: millis(s.navigation_timeout),
            list_timeout_ms: millis(s.list_timeout),
            first_row_timeout_ms: millis(s.first_row_timeout),
            overlay_timeout_ms: millis(s.overlay_timeout),
            profile_timeout_ms: millis(s.profile_timeout),
            click_attempts: s.click_attempts,
            hover_pause_ms: millis(s.hover_pause.base),
            hover_jitter_ms: millis(s.hover_pause.spread),
            settle_pause_ms: millis(s.settle_pause.base),
            settle_jitter_ms: millis(s.settle_pause.spread),
            scroll_step_px: s.scroll_step_px,
            scroll_pause_ms: millis(s.scroll_pause.base),
            scroll_jitter_ms: millis(s.scroll_pause.spread),
            hint_every: s.hint_every,
            hint_pause_ms: millis(s.hint_pause.base),
            failure_threshold: s.failure_threshold,
            failure_ceiling: s.failure_ceiling,
            bottom_margin_px: s.bottom_margin_px,
            dismiss_key: s.dismiss_key,
            start_index: s.start_index,
        }
    }
}

// ============================================================================
// Loading, Saving, Conversion
// ============================================================================

impl Config {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, StoreError> {
        Self::load_from(&Self::default_path())
    }

    /// Loads configuration from a specific path.
    ///
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to the default path.
    pub fn save(&self) -> Result<(), StoreError> {
        self.save_to(&Self::default_path())
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Rejects values the traversal cannot run with.
    pub fn validate(&self) -> Result<(), StoreError> {
        let walk = &self.walk;
        if walk.click_attempts == 0 {
            return Err(StoreError::Config("walk.click_attempts must be at least 1".into()));
        }
        if walk.failure_threshold == 0 {
            return Err(StoreError::Config("walk.failure_threshold must be at least 1".into()));
        }
        if walk.failure_ceiling != 0 && walk.failure_ceiling < walk.failure_threshold {
            return Err(StoreError::Config(
                "walk.failure_ceiling must be 0 or at least walk.failure_threshold".into(),
            ));
        }
        if walk.scroll_step_px <= 0 {
            return Err(StoreError::Config("walk.scroll_step_px must be positive".into()));
        }
        if !walk.bottom_margin_px.is_finite() || walk.bottom_margin_px < 0.0 {
            return Err(StoreError::Config("walk.bottom_margin_px must be non-negative".into()));
        }
        if self.selectors.member_list.trim().is_empty() {
            return Err(StoreError::Config("selectors.member_list is empty".into()));
        }
        Ok(())
    }

    /// Builds the engine settings described by this config.
    pub fn walk_settings(&self) -> WalkSettings {
        let w = &self.walk;
        WalkSettings {
            origin: w.origin.clone(),
            navigation_timeout: Duration::from_millis(w.navigation_timeout_ms),
            list_timeout: Duration::from_millis(w.list_timeout_ms),
            first_row_timeout: Duration::from_millis(w.first_row_timeout_ms),
            overlay_timeout: Duration::from_millis(w.overlay_timeout_ms),
            profile_timeout: Duration::from_millis(w.profile_timeout_ms),
            click_attempts: w.click_attempts,
            hover_pause: Jitter::from_millis(w.hover_pause_ms, w.hover_jitter_ms),
            settle_pause: Jitter::from_millis(w.settle_pause_ms, w.settle_jitter_ms),
            scroll_step_px: w.scroll_step_px,
            scroll_pause: Jitter::from_millis(w.scroll_pause_ms, w.scroll_jitter_ms),
            hint_every: w.hint_every,
            hint_pause: Jitter::from_millis(w.hint_pause_ms, 0),
            failure_threshold: w.failure_threshold,
            failure_ceiling: w.failure_ceiling,
            bottom_margin_px: w.bottom_margin_px,
            dismiss_key: w.dismiss_key.clone(),
            start_index: w.start_index,
            selectors: self.selectors.clone(),
            ..WalkSettings::default()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
