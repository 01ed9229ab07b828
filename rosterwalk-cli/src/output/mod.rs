//! Output formatting for CLI.

mod json;
mod text;

use std::path::Path;

use rosterwalk_walk::WalkOutcome;
use serde::Serialize;

pub use json::JsonFormatter;
pub use text::TextFormatter;

/// What a finished scrape reports.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeSummary {
    pub count: usize,
    pub stop_reason: String,
    pub steps: u32,
    pub failures_seen: u32,
    pub duration_ms: u64,
    pub path: String,
}

impl ScrapeSummary {
    /// Summarizes a walk written to `path`.
    pub fn new(outcome: &WalkOutcome, path: &Path) -> Self {
        Self {
            count: outcome.count(),
            stop_reason: outcome.stop_reason.to_string(),
            steps: outcome.steps,
            failures_seen: outcome.failures_seen,
            duration_ms: u64::try_from(outcome.duration.as_millis()).unwrap_or(u64::MAX),
            path: path.display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests;
