//! End-of-list detection.
//!
//! The run ends only when the failure counter and the scroll position agree.

use rosterwalk_core::TraversalState;

use crate::context::WalkSettings;
use crate::host::ScrollMetrics;

/// Decides when a traversal has reached the end of the list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminationDetector {
    /// Consecutive failures required before the scroll position is consulted.
    pub failure_threshold: u32,
    /// Distance from the scroll maximum that counts as the bottom.
    pub bottom_margin_px: f64,
}

impl TerminationDetector {
    /// Creates a detector.
    pub fn new(failure_threshold: u32, bottom_margin_px: f64) -> Self {
        Self {
            failure_threshold,
            bottom_margin_px,
        }
    }

    /// Creates a detector from walk settings.
    pub fn from_settings(settings: &WalkSettings) -> Self {
        Self::new(settings.failure_threshold, settings.bottom_margin_px)
    }

    /// Returns true once the failure half of the condition holds.
    ///
    /// The controller only queries scroll metrics when this is true.
    pub fn failures_exhausted(&self, state: &TraversalState) -> bool {
        state.consecutive_failures() >= self.failure_threshold
    }

    /// Returns true if the traversal should stop.
    pub fn should_stop(&self, state: &TraversalState, metrics: &ScrollMetrics) -> bool {
        self.failures_exhausted(state) && metrics.is_near_bottom(self.bottom_margin_px)
    }
}

impl Default for TerminationDetector {
    fn default() -> Self {
        Self::from_settings(&WalkSettings::default())
    }
}
