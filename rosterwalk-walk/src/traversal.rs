//! The list traversal controller.
//!
//! The controller owns the index cursor and the failure counter. Each step
//! probes the cursor's row and either extracts it, abandons it, or scrolls
//! to make it render; after every step the termination detector decides
//! whether the walk is over.
//!
//! The list is virtualized: only a window of rows is mounted. A missing
//! index is a gap only when it falls inside that window. Below the window
//! the list scrolls down, above it the list scrolls back, and steps are
//! capped at one viewport so no row is jumped over.

use std::fmt;
use std::time::{Duration, Instant};

use rosterwalk_core::{MemberRecord, TraversalState};
use tracing::{debug, info, instrument, trace, warn};

use crate::context::WalkContext;
use crate::error::{DomError, ExtractError, WalkError};
use crate::extractor::DetailExtractor;
use crate::host::DomSession;
use crate::termination::TerminationDetector;

// ============================================================================
// Step Outcome
// ============================================================================

/// What a single traversal step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// A record was appended for `index`.
    Extracted {
        /// Index of the new record.
        index: u32,
    },
    /// The row resolved but extraction failed; the index was abandoned.
    ExtractionFailed {
        /// Abandoned index.
        index: u32,
        /// Why extraction failed.
        reason: String,
    },
    /// The row is missing from the mounted window; the index was abandoned
    /// without scrolling.
    Gap {
        /// Abandoned index.
        index: u32,
        /// Highest index rendered at the time.
        highest: u32,
    },
    /// The row is not rendered yet; the list was scrolled down and the same
    /// index will be probed again.
    Scrolled {
        /// Index that will be probed again.
        index: u32,
    },
    /// The row was unmounted above the window; the list was scrolled up and
    /// the same index will be probed again.
    ScrolledBack {
        /// Index that will be probed again.
        index: u32,
    },
    /// The row is not rendered and the list is already at its bottom; nothing
    /// was scrolled.
    AtBottom {
        /// Index that will be probed again.
        index: u32,
    },
}

impl StepOutcome {
    /// Returns true if the step produced a record.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Extracted { .. })
    }
}

// ============================================================================
// Walk Outcome
// ============================================================================

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Failures reached the threshold at the bottom of the list.
    EndOfList,
    /// Failures reached the hard ceiling anywhere in the list.
    FailureCeiling,
}

impl StopReason {
    /// Stable identifier used in logs and machine output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EndOfList => "end_of_list",
            Self::FailureCeiling => "failure_ceiling",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct WalkOutcome {
    /// Records in emission order.
    pub records: Vec<MemberRecord>,
    /// Why the run ended.
    pub stop_reason: StopReason,
    /// Steps executed.
    pub steps: u32,
    /// Failed steps over the whole run.
    pub failures_seen: u32,
    /// Wall-clock duration of the traversal.
    pub duration: Duration,
}

impl WalkOutcome {
    /// Number of records.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no record was produced.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// Traversal Controller
// ============================================================================

/// Walks the list one index at a time.
pub struct TraversalController<'a> {
    ctx: &'a WalkContext,
    detector: TerminationDetector,
    state: TraversalState,
    steps: u32,
}

impl<'a> TraversalController<'a> {
    /// Creates a controller positioned at the configured start index.
    pub fn new(ctx: &'a WalkContext) -> Self {
        Self {
            ctx,
            detector: TerminationDetector::from_settings(&ctx.settings),
            state: TraversalState::starting_at(ctx.settings.start_index),
            steps: 0,
        }
    }

    /// Traversal state so far.
    pub fn state(&self) -> &TraversalState {
        &self.state
    }

    /// Steps executed so far.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Walks until the list is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the first run-fatal error. Records gathered before it are
    /// discarded.
    #[instrument(skip_all, fields(start = self.state.current_index()))]
    pub async fn run<S: DomSession + ?Sized>(
        mut self,
        session: &mut S,
    ) -> Result<WalkOutcome, WalkError> {
        let started = Instant::now();
        info!("Starting traversal");

        let stop_reason = loop {
            self.step(session).await?;
            if let Some(reason) = self.check_stop(session).await? {
                break reason;
            }
        };

        let outcome = WalkOutcome {
            stop_reason,
            steps: self.steps,
            failures_seen: self.state.failures_seen(),
            duration: started.elapsed(),
            records: self.state.into_records(),
        };

        info!(
            records = outcome.count(),
            steps = outcome.steps,
            failures = outcome.failures_seen,
            reason = %outcome.stop_reason,
            duration_ms = outcome.duration.as_millis(),
            "Traversal finished"
        );

        Ok(outcome)
    }

    /// Executes one probe of the current index.
    ///
    /// # Errors
    ///
    /// Returns an error only for run-fatal conditions.
    pub async fn step<S: DomSession + ?Sized>(
        &mut self,
        session: &mut S,
    ) -> Result<StepOutcome, WalkError> {
        self.steps += 1;
        let index = self.state.current_index();
        trace!(index, step = self.steps, "Probing");

        let handle = match session.resolve_by_index(index).await {
            Ok(handle) => handle,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                debug!(index, error = %e, "Resolution failed");
                None
            }
        };

        let outcome = match handle {
            Some(row) => match DetailExtractor::new(self.ctx).extract(session, &row).await {
                Ok(record) => {
                    self.state.record_success(record)?;
                    debug!(index, "Extracted");
                    self.maybe_hint(session).await?;
                    StepOutcome::Extracted { index }
                }
                Err(ExtractError::Dom(e)) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    warn!(index, error = %e, "Extraction failed, skipping index");
                    self.state.abandon_current();
                    StepOutcome::ExtractionFailed {
                        index,
                        reason: e.to_string(),
                    }
                }
            },
            None => self.handle_unresolved(session, index).await?,
        };

        Ok(outcome)
    }

    async fn handle_unresolved<S: DomSession + ?Sized>(
        &mut self,
        session: &mut S,
        index: u32,
    ) -> Result<StepOutcome, WalkError> {
        let lowest = tolerate(session.lowest_rendered_index().await, "lowest rendered index")?;
        let highest = tolerate(session.highest_rendered_index().await, "highest rendered index")?;

        // A hole inside the mounted window is a row that does not exist.
        if let (Some(lowest), Some(highest)) = (lowest, highest) {
            if (lowest..highest).contains(&index) {
                debug!(index, lowest, highest, "Index missing inside rendered rows, skipping");
                self.state.abandon_current();
                return Ok(StepOutcome::Gap { index, highest });
            }
        }

        let metrics = tolerate(session.scroll_metrics().await.map(Some), "scroll position")?;
        let margin = self.detector.bottom_margin_px;
        let step = metrics.map_or(self.ctx.settings.scroll_step_px, |m| {
            m.cap_step(self.ctx.settings.scroll_step_px)
        });

        if let Some(lowest) = lowest.filter(|l| index < *l) {
            if metrics.is_some_and(|m| m.is_near_top(margin)) {
                debug!(index, lowest, "Index missing above the first row, skipping");
                self.state.abandon_current();
                return Ok(StepOutcome::Gap {
                    index,
                    highest: highest.unwrap_or(lowest),
                });
            }
            debug!(index, lowest, "Row unmounted above the window, scrolling back");
            self.scroll(session, index, -step).await?;
            self.state.record_failure();
            return Ok(StepOutcome::ScrolledBack { index });
        }

        if metrics.is_some_and(|m| m.is_near_bottom(margin)) {
            debug!(index, "Row not rendered at the bottom of the list");
            self.ctx.pause(self.ctx.settings.scroll_pause).await;
            self.state.record_failure();
            return Ok(StepOutcome::AtBottom { index });
        }

        debug!(index, "Row not rendered, scrolling");
        self.scroll(session, index, step).await?;
        self.state.record_failure();
        Ok(StepOutcome::Scrolled { index })
    }

    async fn scroll<S: DomSession + ?Sized>(
        &self,
        session: &mut S,
        index: u32,
        pixels: i64,
    ) -> Result<(), WalkError> {
        trace!(index, pixels, "Scrolling list");
        if let Err(e) = session.scroll_list_by(pixels).await {
            if e.is_fatal() {
                return Err(e.into());
            }
            debug!(index, error = %e, "Scroll failed");
        }
        self.ctx.pause(self.ctx.settings.scroll_pause).await;
        Ok(())
    }

    async fn maybe_hint<S: DomSession + ?Sized>(&self, session: &mut S) -> Result<(), DomError> {
        let every = self.ctx.settings.hint_every;
        if every == 0 || self.state.successes() % every != 0 {
            return Ok(());
        }

        let index = self.state.current_index();
        trace!(index, "Scroll hint");
        match session.scroll_into_view(index).await {
            Ok(()) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => debug!(index, error = %e, "Scroll hint failed"),
        }
        self.ctx.pause(self.ctx.settings.hint_pause).await;
        Ok(())
    }

    /// Evaluates the stop conditions after a step.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the scroll position failed fatally.
    pub async fn check_stop<S: DomSession + ?Sized>(
        &self,
        session: &mut S,
    ) -> Result<Option<StopReason>, WalkError> {
        if self.detector.failures_exhausted(&self.state) {
            match session.scroll_metrics().await {
                Ok(metrics) if self.detector.should_stop(&self.state, &metrics) => {
                    debug!(
                        failures = self.state.consecutive_failures(),
                        remaining = metrics.remaining(),
                        "Bottom reached"
                    );
                    return Ok(Some(StopReason::EndOfList));
                }
                Ok(_) => {}
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => debug!(error = %e, "Could not read scroll position"),
            }
        }

        let ceiling = self.ctx.settings.failure_ceiling;
        if ceiling > 0 && self.state.consecutive_failures() >= ceiling {
            warn!(
                failures = self.state.consecutive_failures(),
                index = self.state.current_index(),
                "Failure ceiling reached before the end of the list"
            );
            return Ok(Some(StopReason::FailureCeiling));
        }

        Ok(None)
    }
}

/// Maps a non-fatal read error to `None`.
fn tolerate<T>(result: Result<Option<T>, DomError>, what: &str) -> Result<Option<T>, DomError> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            debug!(error = %e, "Could not read {what}");
            Ok(None)
        }
    }
}

impl fmt::Debug for TraversalController<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraversalController")
            .field("detector", &self.detector)
            .field("state", &self.state)
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}
