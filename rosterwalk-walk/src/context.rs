//! Walk context: settings and the pacer used by every engine component.
//!
//! The browser session is deliberately *not* part of the context. It is passed
//! to each operation as `&mut`, so only one component can drive it at a time.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pacing::{Jitter, Pacer, TokioPacer};

// ============================================================================
// Selectors
// ============================================================================

/// CSS selectors describing the target application's DOM.
///
/// Defaults match Discord's web client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    /// Scrollable member list container.
    pub member_list: String,
    /// Control that reveals a hidden member list.
    pub show_member_list: String,
    /// Attribute carrying a row's list index.
    pub index_attribute: String,
    /// Display name inside a row.
    pub row_name: String,
    /// Avatar image inside a row.
    pub row_avatar: String,
    /// Presence indicator inside a row (read through `aria-label`).
    pub row_status: String,
    /// The detail overlay.
    pub overlay: String,
    /// Account handle inside the overlay.
    pub overlay_username: String,
    /// Profile link inside the overlay.
    pub overlay_profile_link: String,
    /// Avatar image inside the overlay.
    pub overlay_avatar: String,
    /// Marker of a loaded profile page.
    pub profile_marker: String,
    /// Marker of the login page.
    pub login_marker: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            member_list: r#"[aria-label="Members"]"#.to_string(),
            show_member_list: r#"[aria-label="Show Member List"]"#.to_string(),
            index_attribute: "data-list-index".to_string(),
            row_name: r#"[class*="username"], [class*="name__"]"#.to_string(),
            row_avatar: r#"img[src*="avatars"]"#.to_string(),
            row_status: r#"[class*="status"]"#.to_string(),
            overlay: r#"[role="dialog"]"#.to_string(),
            overlay_username: r#"[class*="userTagUsername"]"#.to_string(),
            overlay_profile_link: r#"a[href*="/users/"]"#.to_string(),
            overlay_avatar: r#"img[src*="avatars"]"#.to_string(),
            profile_marker: r#"[class*="username"], [class*="userProfile"]"#.to_string(),
            login_marker: r#"[aria-label="Login"]"#.to_string(),
        }
    }
}

// ============================================================================
// Walk Settings
// ============================================================================

/// Timing and threshold settings for a traversal run.
#[derive(Debug, Clone)]
pub struct WalkSettings {
    /// Origin of the web client, used to build profile URLs.
    pub origin: String,
    /// Bound on a page navigation.
    pub navigation_timeout: Duration,
    /// Bound on waiting for the member list (and its reveal control).
    pub list_timeout: Duration,
    /// Bound on waiting for the first rendered row.
    pub first_row_timeout: Duration,
    /// Bound on waiting for the detail overlay after one click.
    pub overlay_timeout: Duration,
    /// Bound on waiting for a profile page (or the login form) to appear.
    pub profile_timeout: Duration,
    /// Interval between polls while waiting on a page.
    pub poll_interval: Duration,
    /// Clicks issued before an overlay is given up on.
    pub click_attempts: u32,
    /// Pause after hovering a row.
    pub hover_pause: Jitter,
    /// Pause after dismissing the overlay.
    pub settle_pause: Jitter,
    /// Pixels scrolled when the cursor's row is not rendered yet.
    pub scroll_step_px: i64,
    /// Pause after each incremental scroll.
    pub scroll_pause: Jitter,
    /// Successful extractions between scroll-into-view hints.
    pub hint_every: u32,
    /// Pause after a scroll-into-view hint.
    pub hint_pause: Jitter,
    /// Consecutive failures that, at the bottom of the list, end the run.
    pub failure_threshold: u32,
    /// Consecutive failures that end the run regardless of scroll position.
    pub failure_ceiling: u32,
    /// Distance from the scroll maximum that still counts as "bottom".
    pub bottom_margin_px: f64,
    /// Key that dismisses the overlay.
    pub dismiss_key: String,
    /// Index the traversal starts at.
    pub start_index: u32,
    /// DOM selectors.
    pub selectors: Selectors,
}

impl Default for WalkSettings {
    fn default() -> Self {
        Self {
            origin: "https://discord.com".to_string(),
            navigation_timeout: Duration::from_secs(30),
            list_timeout: Duration::from_secs(10),
            first_row_timeout: Duration::from_secs(5),
            overlay_timeout: Duration::from_secs(5),
            profile_timeout: Duration::from_secs(15),
            poll_interval: Duration::from_millis(100),
            click_attempts: 2,
            hover_pause: Jitter::from_millis(150, 100),
            settle_pause: Jitter::from_millis(300, 150),
            scroll_step_px: 400,
            scroll_pause: Jitter::from_millis(600, 400),
            hint_every: 10,
            hint_pause: Jitter::from_millis(300, 0),
            failure_threshold: 3,
            failure_ceiling: 40,
            bottom_margin_px: 8.0,
            dismiss_key: "Escape".to_string(),
            start_index: 0,
            selectors: Selectors::default(),
        }
    }
}

impl WalkSettings {
    /// Settings with every pause set to zero.
    pub fn without_pauses() -> Self {
        Self {
            hover_pause: Jitter::ZERO,
            settle_pause: Jitter::ZERO,
            scroll_pause: Jitter::ZERO,
            hint_pause: Jitter::ZERO,
            ..Default::default()
        }
    }

    /// Sets the overlay timeout.
    pub fn with_overlay_timeout(mut self, timeout: Duration) -> Self {
        self.overlay_timeout = timeout;
        self
    }

    /// Sets the failure threshold.
    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Sets the selectors.
    pub fn with_selectors(mut self, selectors: Selectors) -> Self {
        self.selectors = selectors;
        self
    }

    /// Builds the profile URL for a user id.
    pub fn profile_url(&self, user_id: &str) -> String {
        format!("{}/users/{}", self.origin.trim_end_matches('/'), user_id)
    }
}

// ============================================================================
// Walk Context
// ============================================================================

/// Settings plus the pacer shared by the controller and the extractor.
pub struct WalkContext {
    /// Walk settings.
    pub settings: WalkSettings,
    /// Where every pause goes.
    pub pacer: Arc<dyn Pacer>,
}

impl WalkContext {
    /// Creates a context with default settings and real sleeping.
    pub fn new() -> Self {
        Self::with_settings(WalkSettings::default())
    }

    /// Creates a context with custom settings and real sleeping.
    pub fn with_settings(settings: WalkSettings) -> Self {
        Self {
            settings,
            pacer: Arc::new(TokioPacer),
        }
    }

    /// Creates a builder for customizing the context.
    pub fn builder() -> WalkContextBuilder {
        WalkContextBuilder::new()
    }

    /// Draws a delay from `jitter` and waits for it.
    pub async fn pause(&self, jitter: Jitter) {
        let delay = jitter.sample_now();
        self.pacer.pause(delay).await;
    }

    /// Selectors in use.
    pub fn selectors(&self) -> &Selectors {
        &self.settings.selectors
    }
}

impl Default for WalkContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WalkContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalkContext")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Walk Context Builder
// ============================================================================

/// Builder for constructing a `WalkContext`.
pub struct WalkContextBuilder {
    settings: WalkSettings,
    pacer: Option<Arc<dyn Pacer>>,
}

impl WalkContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            settings: WalkSettings::default(),
            pacer: None,
        }
    }

    /// Sets the walk settings.
    pub fn settings(mut self, settings: WalkSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the pacer.
    pub fn pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = Some(pacer);
        self
    }

    /// Sets the failure threshold.
    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.settings.failure_threshold = threshold;
        self
    }

    /// Sets the index the traversal starts at.
    pub fn start_index(mut self, index: u32) -> Self {
        self.settings.start_index = index;
        self
    }

    /// Builds the walk context.
    pub fn build(self) -> WalkContext {
        WalkContext {
            settings: self.settings,
            pacer: self.pacer.unwrap_or_else(|| Arc::new(TokioPacer)),
        }
    }
}

impl Default for WalkContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::InstantPacer;

    #[test]
    fn test_default_settings() {
        let settings = WalkSettings::default();
        assert_eq!(settings.click_attempts, 2);
        assert_eq!(settings.failure_threshold, 3);
        assert_eq!(settings.hint_every, 10);
        assert_eq!(settings.dismiss_key, "Escape");
    }

    #[test]
    fn test_profile_url() {
        let mut settings = WalkSettings::default();
        assert_eq!(settings.profile_url("42"), "https://discord.com/users/42");

        settings.origin = "https://canary.discord.com/".to_string();
        assert_eq!(settings.profile_url("42"), "https://canary.discord.com/users/42");
    }

    #[test]
    fn test_selectors_partial_deserialize() {
        let selectors: Selectors =
            serde_json::from_str(r#"{"index_attribute": "aria-posinset"}"#).unwrap();
        assert_eq!(selectors.index_attribute, "aria-posinset");
        assert_eq!(selectors.overlay, Selectors::default().overlay);
    }

    #[tokio::test]
    async fn test_context_builder_uses_pacer() {
        let pacer = Arc::new(InstantPacer::new());
        let ctx = WalkContext::builder()
            .pacer(pacer.clone())
            .failure_threshold(5)
            .start_index(3)
            .build();

        assert_eq!(ctx.settings.failure_threshold, 5);
        assert_eq!(ctx.settings.start_index, 3);

        ctx.pause(Jitter::fixed(Duration::from_millis(40))).await;
        assert_eq!(pacer.total(), Duration::from_millis(40));
    }
}
