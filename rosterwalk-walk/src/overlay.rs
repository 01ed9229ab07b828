//! The transient detail overlay as an explicit state machine.
//!
//! ```text
//! Closed --open()--> Opening --seen--> Open --dismiss()--> Closing --> Closed
//!                       |                                     ^
//!                       +------------- dismiss() -------------+
//! ```
//!
//! An [`Overlay`] is created per extraction and must be dismissed before it
//! is dropped; [`DetailExtractor`](crate::extractor::DetailExtractor) does
//! that on every exit path.

use tracing::{debug, warn};

use crate::context::WalkSettings;
use crate::error::{DomError, ExtractError};
use crate::host::{DomSession, OverlaySnapshot, RowHandle};

/// Where the overlay is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    /// Nothing open; the list is browsable.
    Closed,
    /// A click was issued and the overlay has not been seen yet.
    Opening,
    /// The overlay was observed.
    Open,
    /// A dismissal is in flight.
    Closing,
}

/// Tracks one row's overlay.
#[derive(Debug)]
pub struct Overlay {
    state: OverlayState,
}

impl Overlay {
    /// Creates a closed overlay tracker.
    pub fn new() -> Self {
        Self {
            state: OverlayState::Closed,
        }
    }

    /// Current state.
    pub fn state(&self) -> OverlayState {
        self.state
    }

    /// Clicks `row` until the overlay shows up or the attempts run out.
    ///
    /// # Errors
    ///
    /// [`ExtractError::OverlayNotShown`] once every attempt timed out, or the
    /// underlying error if the session failed fatally.
    pub async fn open<S: DomSession + ?Sized>(
        &mut self,
        session: &mut S,
        row: &RowHandle,
        settings: &WalkSettings,
    ) -> Result<(), ExtractError> {
        let attempts = settings.click_attempts.max(1);

        for attempt in 1..=attempts {
            self.state = OverlayState::Opening;

            if let Err(e) = session.click(row).await {
                if e.is_fatal() {
                    return Err(e.into());
                }
                debug!(index = row.index, attempt, error = %e, "Click failed");
                continue;
            }

            match session
                .wait_for(&settings.selectors.overlay, settings.overlay_timeout)
                .await
            {
                Ok(()) => {
                    self.state = OverlayState::Open;
                    return Ok(());
                }
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => debug!(index = row.index, attempt, error = %e, "Overlay not shown"),
            }
        }

        Err(ExtractError::OverlayNotShown { attempts })
    }

    /// Reads the overlay if it was observed open.
    ///
    /// Returns `Ok(None)` if it never opened or has disappeared since.
    pub async fn read<S: DomSession + ?Sized>(
        &self,
        session: &mut S,
    ) -> Result<Option<OverlaySnapshot>, DomError> {
        if self.state != OverlayState::Open {
            return Ok(None);
        }
        session.read_overlay().await
    }

    /// Returns the overlay to `Closed`, swallowing any dismissal error.
    pub async fn dismiss<S: DomSession + ?Sized>(&mut self, session: &mut S, key: &str) {
        if self.state == OverlayState::Closed {
            return;
        }

        self.state = OverlayState::Closing;
        if let Err(e) = session.press_key(key).await {
            debug!(error = %e, "Overlay dismissal failed");
        }
        self.state = OverlayState::Closed;
    }
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Overlay {
    fn drop(&mut self) {
        if self.state != OverlayState::Closed {
            warn!(state = ?self.state, "Overlay dropped without being dismissed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::{Call, FakeSession};

    fn settings() -> WalkSettings {
        WalkSettings::without_pauses()
    }

    #[tokio::test]
    async fn test_open_and_dismiss() {
        let mut session = FakeSession::with_members(3);
        let row = RowHandle::new(1, "row-1");
        let mut overlay = Overlay::new();

        overlay.open(&mut session, &row, &settings()).await.unwrap();
        assert_eq!(overlay.state(), OverlayState::Open);
        assert!(session.overlay_is_open());

        let snapshot = overlay.read(&mut session).await.unwrap().unwrap();
        assert_eq!(snapshot.username.as_deref(), Some("member_1"));

        overlay.dismiss(&mut session, "Escape").await;
        assert_eq!(overlay.state(), OverlayState::Closed);
        assert!(!session.overlay_is_open());
    }

    #[tokio::test]
    async fn test_open_gives_up_after_attempts() {
        let mut session = FakeSession::with_members(3);
        session.row_mut(2).overlay_opens = false;
        let row = RowHandle::new(2, "row-2");
        let mut overlay = Overlay::new();

        let err = overlay.open(&mut session, &row, &settings()).await.unwrap_err();
        assert!(matches!(err, ExtractError::OverlayNotShown { attempts: 2 }));
        assert_eq!(session.count(&Call::Click(2)), 2);
        assert_eq!(overlay.state(), OverlayState::Opening);

        overlay.dismiss(&mut session, "Escape").await;
        assert_eq!(overlay.state(), OverlayState::Closed);
        assert_eq!(session.count(&Call::PressKey("Escape".into())), 1);
    }

    #[tokio::test]
    async fn test_dismiss_when_closed_is_noop() {
        let mut session = FakeSession::with_members(1);
        let mut overlay = Overlay::new();
        overlay.dismiss(&mut session, "Escape").await;
        assert!(session.calls.is_empty());
    }

    #[tokio::test]
    async fn test_read_before_open_is_none() {
        let mut session = FakeSession::with_members(1);
        let overlay = Overlay::new();
        assert!(overlay.read(&mut session).await.unwrap().is_none());
        assert!(session.calls.is_empty());
    }
}
