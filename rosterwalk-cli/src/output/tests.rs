//! CLI output formatting tests.
//!
//! These tests verify that CLI output is correctly formatted for both
//! text and JSON output modes.

use std::path::Path;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use rosterwalk_core::{MemberRecord, PresenceStatus, RosterDocument};
use rosterwalk_walk::{StopReason, WalkOutcome};

use super::{JsonFormatter, ScrapeSummary, TextFormatter};

fn sample_members() -> Vec<MemberRecord> {
    let mut ferris = MemberRecord::new(0, "Ferris");
    ferris.username = Some("ferris".to_string());
    ferris.user_id = Some("123456789".to_string());
    ferris.status = Some(PresenceStatus::Online);

    let unknown = MemberRecord::new(2, "");

    let mut corro = MemberRecord::new(5, "Corro");
    corro.status = Some(PresenceStatus::DoNotDisturb);

    vec![ferris, unknown, corro]
}

fn sample_document() -> RosterDocument {
    RosterDocument::at(
        Utc.with_ymd_and_hms(2024, 3, 14, 9, 15, 2).unwrap(),
        sample_members(),
        Some("https://discord.com/channels/1/2".to_string()),
    )
}

fn sample_summary(stop_reason: StopReason) -> ScrapeSummary {
    let outcome = WalkOutcome {
        records: sample_members(),
        stop_reason,
        steps: 9,
        failures_seen: 6,
        duration: Duration::from_millis(12_500),
    };
    ScrapeSummary::new(&outcome, Path::new("/tmp/members.json"))
}

mod text_formatter_tests {
    use super::*;

    #[test]
    fn test_member_line() {
        let formatter = TextFormatter::new(false);
        let line = formatter.format_member(&sample_members()[0]);
        assert_eq!(line, "    0  Ferris @ferris  123456789  Online");
    }

    #[test]
    fn test_member_line_without_extras() {
        let formatter = TextFormatter::new(false);
        let line = formatter.format_member(&sample_members()[1]);
        assert_eq!(line, "    2  Unknown");
    }

    #[test]
    fn test_document_limit() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_document(&sample_document(), Some(1));

        assert!(output.starts_with("3 members"));
        assert!(output.contains("Ferris"));
        assert!(!output.contains("Corro"));
        assert!(output.contains("... 2 more"));
    }

    #[test]
    fn test_summary() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_summary(&sample_summary(StopReason::EndOfList));

        assert!(output.starts_with("3 members"));
        assert!(output.contains("9 steps, 6 failures, 12.5s, stopped at end of list"));
        assert!(output.contains("/tmp/members.json"));
        assert!(!output.contains("incomplete"));
    }

    #[test]
    fn test_summary_warns_on_ceiling() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_summary(&sample_summary(StopReason::FailureCeiling));
        assert!(output.contains("incomplete"));
    }
}

mod json_formatter_tests {
    use super::*;

    #[test]
    fn test_summary_fields() {
        let formatter = JsonFormatter::new(false);
        let json = formatter.format(&sample_summary(StopReason::EndOfList)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["count"], 3);
        assert_eq!(value["stopReason"], "end_of_list");
        assert_eq!(value["failuresSeen"], 6);
        assert_eq!(value["durationMs"], 12_500);
        assert_eq!(value["path"], "/tmp/members.json");
    }

    #[test]
    fn test_document_is_parseable() {
        let formatter = JsonFormatter::new(true);
        let json = formatter.format_document(&sample_document(), None).unwrap();

        let parsed = RosterDocument::from_json(&json).unwrap();
        assert_eq!(parsed, sample_document());
    }

    #[test]
    fn test_document_limit_keeps_count_consistent() {
        let formatter = JsonFormatter::new(false);
        let json = formatter.format_document(&sample_document(), Some(2)).unwrap();

        let parsed = RosterDocument::from_json(&json).unwrap();
        assert_eq!(parsed.count, 2);
        assert_eq!(parsed.members[1].index, 2);
    }

    #[test]
    fn test_pretty_vs_compact() {
        let data = serde_json::json!({"a": 1});
        assert!(!JsonFormatter::new(false).format(&data).unwrap().contains('\n'));
        assert!(JsonFormatter::new(true).format(&data).unwrap().contains('\n'));
    }
}
