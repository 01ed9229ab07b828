//! Host APIs: the browser session the engine drives.
//!
//! - [`DomSession`] - The operations the traversal engine needs from a page
//! - [`chrome`] - A [`DomSession`] over the Chrome DevTools Protocol
//! - [`scripts`] - In-page scripts used by the Chrome backend
//!
//! The session is one exclusively borrowed resource. Every method takes
//! `&mut self`, which keeps a second overlay or a concurrent scroll from
//! ever being issued while another interaction is in flight.

pub mod chrome;
pub mod scripts;

#[cfg(test)]
pub(crate) mod fake;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomError;

pub use chrome::{ChromeSession, ConnectOptions};

// ============================================================================
// Handles and Snapshots
// ============================================================================

/// A rendered list row addressed by its index attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowHandle {
    /// The row's list index.
    pub index: u32,
    /// Selector that re-finds exactly this row.
    pub selector: String,
}

impl RowHandle {
    /// Creates a handle.
    pub fn new(index: u32, selector: impl Into<String>) -> Self {
        Self {
            index,
            selector: selector.into(),
        }
    }
}

/// Raw values read from a row without opening anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSnapshot {
    /// Rendered display name.
    pub display_name: Option<String>,
    /// Avatar image URL.
    pub avatar: Option<String>,
    /// Accessible label of the presence indicator.
    pub status_label: Option<String>,
}

/// Raw values read from the open detail overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySnapshot {
    /// Account handle.
    pub username: Option<String>,
    /// `href` of the profile link.
    pub profile_href: Option<String>,
    /// Avatar image URL.
    pub avatar: Option<String>,
}

/// Scroll position of the list container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollMetrics {
    /// Current scroll offset.
    pub scroll_top: f64,
    /// Total scrollable height.
    pub scroll_height: f64,
    /// Visible height.
    pub client_height: f64,
}

impl ScrollMetrics {
    /// Distance left until the scroll maximum.
    pub fn remaining(&self) -> f64 {
        (self.scroll_height - self.client_height - self.scroll_top).max(0.0)
    }

    /// Returns true if the position is within `margin` of the maximum.
    pub fn is_near_bottom(&self, margin: f64) -> bool {
        self.remaining() <= margin
    }

    /// Returns true if the position is within `margin` of the top.
    pub fn is_near_top(&self, margin: f64) -> bool {
        self.scroll_top <= margin
    }

    /// Caps a scroll step at one viewport so no row is jumped over.
    pub fn cap_step(&self, pixels: i64) -> i64 {
        #[allow(clippy::cast_possible_truncation)]
        let viewport = self.client_height.floor() as i64;
        if viewport > 0 {
            pixels.clamp(-viewport, viewport)
        } else {
            pixels
        }
    }
}

// ============================================================================
// DOM Session
// ============================================================================

/// The page operations the traversal engine is built on.
///
/// List-specific operations (`resolve_by_index`, `read_row`, `read_overlay`,
/// scrolling) use the selectors the implementation was configured with.
/// Generic operations take a selector explicitly.
#[async_trait]
pub trait DomSession: Send {
    /// Navigates to `url` and waits until the page is interactive.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), DomError>;

    /// URL of the current page.
    async fn current_url(&mut self) -> Result<String, DomError>;

    /// Returns true if `selector` matches anything right now.
    async fn exists(&mut self, selector: &str) -> Result<bool, DomError>;

    /// Waits until `selector` matches, failing with [`DomError::Timeout`].
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), DomError>;

    /// Clicks the first element matching `selector`.
    async fn click_selector(&mut self, selector: &str) -> Result<(), DomError>;

    /// Finds the row whose index attribute equals `index` inside the list.
    ///
    /// Returns `Ok(None)` if no such row is rendered, and
    /// [`DomError::ContainerMissing`] if the list itself is gone.
    async fn resolve_by_index(&mut self, index: u32) -> Result<Option<RowHandle>, DomError>;

    /// Highest index currently rendered in the list, if any row is rendered.
    async fn highest_rendered_index(&mut self) -> Result<Option<u32>, DomError>;

    /// Lowest index currently rendered in the list, if any row is rendered.
    ///
    /// Rows above it may exist but be unmounted by the virtualized list.
    async fn lowest_rendered_index(&mut self) -> Result<Option<u32>, DomError>;

    /// Moves the pointer over a row.
    async fn hover(&mut self, row: &RowHandle) -> Result<(), DomError>;

    /// Clicks a row.
    async fn click(&mut self, row: &RowHandle) -> Result<(), DomError>;

    /// Reads the row-local fields.
    async fn read_row(&mut self, row: &RowHandle) -> Result<RowSnapshot, DomError>;

    /// Reads the open overlay, or `None` if no overlay is present.
    async fn read_overlay(&mut self) -> Result<Option<OverlaySnapshot>, DomError>;

    /// Sends a key press to the page.
    async fn press_key(&mut self, key: &str) -> Result<(), DomError>;

    /// Scrolls the list container by `pixels`.
    async fn scroll_list_by(&mut self, pixels: i64) -> Result<(), DomError>;

    /// Scrolls the row at `index` into view, if it is rendered.
    async fn scroll_into_view(&mut self, index: u32) -> Result<(), DomError>;

    /// Current scroll position of the list container.
    async fn scroll_metrics(&mut self) -> Result<ScrollMetrics, DomError>;

    /// Evaluates a script in the page and returns its JSON value.
    async fn evaluate(&mut self, script: &str) -> Result<serde_json::Value, DomError>;
}
