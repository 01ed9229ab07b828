//! Text output formatting with colors.

use chrono::Local;
use rosterwalk_core::{MemberRecord, PresenceStatus, RosterDocument};

use super::ScrapeSummary;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats the result of a scrape.
    pub fn format_summary(&self, summary: &ScrapeSummary) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "{} {}",
            self.bold(&summary.count.to_string()),
            if summary.count == 1 { "member" } else { "members" }
        ));

        #[allow(clippy::cast_precision_loss)]
        let seconds = summary.duration_ms as f64 / 1000.0;
        lines.push(self.dim(&format!(
            "{} steps, {} failures, {seconds:.1}s, stopped at {}",
            summary.steps,
            summary.failures_seen,
            summary.stop_reason.replace('_', " ")
        )));

        if summary.stop_reason == "failure_ceiling" {
            lines.push(self.yellow("The list never reached its end; the export may be incomplete."));
        }

        lines.push(format!("Saved:  {}", self.cyan(&summary.path)));
        lines.join("\n")
    }

    /// Formats a document as a header plus one line per member.
    pub fn format_document(&self, document: &RosterDocument, limit: Option<usize>) -> String {
        let mut lines = Vec::new();

        let generated = document.generated_at.with_timezone(&Local);
        lines.push(format!(
            "{} {}",
            self.bold(&format!("{} members", document.count)),
            self.dim(&format!("({})", generated.format("%Y-%m-%d %H:%M")))
        ));
        if let Some(url) = &document.source_url {
            lines.push(self.dim(url));
        }
        lines.push(String::new());

        let shown = limit.unwrap_or(usize::MAX);
        for record in document.members.iter().take(shown) {
            lines.push(self.format_member(record));
        }

        let hidden = document.members.len().saturating_sub(shown);
        if hidden > 0 {
            lines.push(self.dim(&format!("... {hidden} more")));
        }

        lines.join("\n")
    }

    /// Formats one member on a single line.
    pub fn format_member(&self, record: &MemberRecord) -> String {
        let mut line = format!("{:>5}  {}", record.index, self.bold(&record.display_name));

        if let Some(username) = &record.username {
            line.push_str(&format!(" {}", self.dim(&format!("@{username}"))));
        }
        if let Some(id) = &record.user_id {
            line.push_str(&format!("  {}", self.dim(id)));
        }
        if let Some(status) = record.status {
            line.push_str(&format!("  {}", self.format_status(status)));
        }

        line
    }

    /// Formats a presence state.
    pub fn format_status(&self, status: PresenceStatus) -> String {
        let label = status.display_name();
        match status {
            PresenceStatus::Online => self.green(label),
            PresenceStatus::Idle => self.yellow(label),
            PresenceStatus::DoNotDisturb => self.red(label),
            PresenceStatus::Streaming => self.magenta(label),
            PresenceStatus::Offline => self.dim(label),
        }
    }

    // ========================================================================
    // Color helpers
    // ========================================================================

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn magenta(&self, text: &str) -> String {
        self.paint(MAGENTA, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

// ============================================================================
// Tests
// ============================================================================
