//! Walk error types.

use std::time::Duration;
use thiserror::Error;

// ============================================================================
// DOM Error
// ============================================================================

/// Error type for [`DomSession`](crate::host::DomSession) operations.
#[derive(Debug, Error)]
pub enum DomError {
    /// A wait for an element ran out of time.
    #[error("Timed out after {timeout:?} waiting for {selector}")]
    Timeout {
        /// What was being waited for.
        selector: String,
        /// How long the wait lasted.
        timeout: Duration,
    },

    /// The addressed element is not (or no longer) in the document.
    #[error("Element not found: {0}")]
    NotFound(String),

    /// The list container itself is missing from the page.
    #[error("List container not found: {0}")]
    ContainerMissing(String),

    /// Navigation did not complete.
    #[error("Navigation to {url} failed: {reason}")]
    Navigation {
        /// Target URL.
        url: String,
        /// Why it failed.
        reason: String,
    },

    /// Script evaluation failed or returned something unexpected.
    #[error("Script error: {0}")]
    Script(String),

    /// The connection to the browser is gone.
    #[error("Browser disconnected: {0}")]
    Disconnected(String),

    /// Any other backend failure.
    #[error("Browser error: {0}")]
    Backend(String),
}

impl DomError {
    /// Returns true if the session cannot be used any further.
    ///
    /// Fatal errors end the whole run; everything else only counts as a
    /// failed traversal step.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ContainerMissing(_) | Self::Navigation { .. } | Self::Disconnected(_)
        )
    }

    /// Returns true if this is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<serde_json::Error> for DomError {
    fn from(err: serde_json::Error) -> Self {
        DomError::Script(format!("Unexpected script result: {err}"))
    }
}

// ============================================================================
// Extract Error
// ============================================================================

/// Error type for a single detail-view extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The overlay never appeared after every click attempt.
    #[error("Detail overlay did not open after {attempts} attempts")]
    OverlayNotShown {
        /// Number of clicks issued.
        attempts: u32,
    },

    /// A DOM operation failed.
    #[error("DOM error: {0}")]
    Dom(#[from] DomError),
}

impl ExtractError {
    /// Returns true if the failure must end the run.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Dom(err) => err.is_fatal(),
            Self::OverlayNotShown { .. } => false,
        }
    }
}

// ============================================================================
// Walk Error
// ============================================================================

/// Error type for run-level failures.
///
/// Every variant aborts the run; no partial result is produced.
#[derive(Debug, Error)]
pub enum WalkError {
    /// The browser session failed in a way that cannot be recovered.
    #[error("Session error: {0}")]
    Session(#[from] DomError),

    /// The member list never appeared.
    #[error("Member list not found: {0}")]
    ListNotFound(String),

    /// The session is not signed in.
    #[error("Not signed in: landed on the login page")]
    SignedOut,

    /// The URL is malformed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A traversal invariant was violated.
    #[error("Core error: {0}")]
    Core(#[from] rosterwalk_core::CoreError),

    /// Persisting the records failed.
    #[error("Failed to persist records: {0}")]
    Persist(String),
}

impl From<url::ParseError> for WalkError {
    fn from(err: url::ParseError) -> Self {
        WalkError::InvalidUrl(err.to_string())
    }
}
