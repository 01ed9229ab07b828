//! State owned by a single traversal run.
//!
//! The state is created when a run starts, mutated only by the traversal
//! controller, and consumed when the run's records are handed to a sink.

use super::member::MemberRecord;
use crate::error::CoreError;

/// Cursor, failure counter, and ordered results of one run.
#[derive(Debug, Clone, Default)]
pub struct TraversalState {
    current_index: u32,
    consecutive_failures: u32,
    successes: u32,
    failures_seen: u32,
    records: Vec<MemberRecord>,
}

impl TraversalState {
    /// Creates a state positioned at index 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state positioned at `index`.
    pub fn starting_at(index: u32) -> Self {
        Self {
            current_index: index,
            ..Self::default()
        }
    }

    /// Index the controller will probe next.
    pub fn current_index(&self) -> u32 {
        self.current_index
    }

    /// Failures since the last successful extraction.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Number of records appended so far.
    pub fn successes(&self) -> u32 {
        self.successes
    }

    /// Total failures over the whole run, never reset.
    pub fn failures_seen(&self) -> u32 {
        self.failures_seen
    }

    /// Records gathered so far, in emission order.
    pub fn records(&self) -> &[MemberRecord] {
        &self.records
    }

    /// Consumes the state and returns its records.
    pub fn into_records(self) -> Vec<MemberRecord> {
        self.records
    }

    /// Appends a record produced at the current index.
    ///
    /// Advances the cursor past the record and resets the failure counter.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::OutOfOrder`] if the record's index is below the
    /// cursor or does not follow the last appended record.
    pub fn record_success(&mut self, record: MemberRecord) -> Result<(), CoreError> {
        if let Some(last) = self.records.last() {
            if record.index <= last.index {
                return Err(CoreError::OutOfOrder {
                    index: record.index,
                    previous: last.index,
                });
            }
        }
        if record.index < self.current_index {
            return Err(CoreError::OutOfOrder {
                index: record.index,
                previous: self.current_index.saturating_sub(1),
            });
        }

        self.current_index = record.index.saturating_add(1);
        self.consecutive_failures = 0;
        self.successes += 1;
        self.records.push(record);
        Ok(())
    }

    /// Counts a failed step without moving the cursor.
    pub fn record_failure(&mut self) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.failures_seen = self.failures_seen.saturating_add(1);
    }

    /// Counts a failed step and moves the cursor past the current index.
    ///
    /// The abandoned index is never revisited within the run.
    pub fn abandon_current(&mut self) {
        self.record_failure();
        self.current_index = self.current_index.saturating_add(1);
    }
}
