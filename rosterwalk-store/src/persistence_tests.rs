//! Persistence round-trip and edge case tests.
//!
//! Tests file I/O helpers, the JSON file sink, and reading documents back.

use chrono::{TimeZone, Utc};
use std::path::PathBuf;
use tempfile::TempDir;

use crate::error::StoreError;
use crate::persistence::{create_json, ensure_dir, load_json};
use crate::sink::{JsonFileSink, load_document};
use rosterwalk_core::{MemberRecord, PresenceStatus, RecordSink, RosterDocument};

fn sample_records() -> Vec<MemberRecord> {
    let mut first = MemberRecord::new(0, "Ferris");
    first.username = Some("ferris".to_string());
    first.user_id = Some("123456789012345678".to_string());
    first.avatar = Some("https://cdn.discordapp.com/avatars/123456789012345678/a.webp".to_string());
    first.status = Some(PresenceStatus::DoNotDisturb);

    let second = MemberRecord::new(3, "");

    let mut third = MemberRecord::new(4, "Crab ✨");
    third.status = Some(PresenceStatus::Offline);

    vec![first, second, third]
}

// ============================================================================
// JSON Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_create_and_load_json_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("test.json");

    let document = RosterDocument::new(sample_records(), None);
    create_json(&file_path, &document).await.unwrap();

    let loaded: RosterDocument = load_json(&file_path).await.unwrap();
    assert_eq!(loaded, document);
}

#[tokio::test]
async fn test_create_json_never_overwrites() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("once.json");

    create_json(&file_path, &serde_json::json!({"v": 1})).await.unwrap();
    let err = create_json(&file_path, &serde_json::json!({"v": 2}))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Io(ref e) if e.kind() == std::io::ErrorKind::AlreadyExists));
    let loaded: serde_json::Value = load_json(&file_path).await.unwrap();
    assert_eq!(loaded["v"], 1);
}

#[tokio::test]
async fn test_load_nonexistent_file() {
    let file_path = PathBuf::from("/nonexistent/path/members.json");

    let result: Result<RosterDocument, _> = load_json(&file_path).await;
    assert!(matches!(result, Err(StoreError::Io(_))));
}

#[tokio::test]
async fn test_ensure_dir_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("exports");

    ensure_dir(&dir).await.unwrap();
    ensure_dir(&dir).await.unwrap();
    assert!(dir.is_dir());
}

// ============================================================================
// Sink Tests
// ============================================================================

#[test]
fn test_file_name_contains_utc_stamp() {
    let at = Utc.with_ymd_and_hms(2024, 3, 14, 9, 15, 2).unwrap();

    assert_eq!(JsonFileSink::file_name(at, 0), "members-20240314T091502.000Z.json");
    assert_eq!(JsonFileSink::file_name(at, 2), "members-20240314T091502.000Z-2.json");
}

#[tokio::test]
async fn test_sink_creates_directory_and_roundtrips() {
    let temp_dir = TempDir::new().unwrap();
    let sink = JsonFileSink::new(temp_dir.path().join("out").join("runs"));
    let records = sample_records();

    let path = sink
        .write(&records, Some("https://discord.com/channels/1/2"))
        .await
        .unwrap();

    assert!(path.starts_with(sink.dir()));
    let document = load_document(&path).await.unwrap();
    assert_eq!(document.members, records);
    assert_eq!(document.count, 3);
    assert_eq!(document.source_url.as_deref(), Some("https://discord.com/channels/1/2"));
}

#[tokio::test]
async fn test_sink_never_overwrites() {
    let temp_dir = TempDir::new().unwrap();
    let sink = JsonFileSink::new(temp_dir.path());
    let at = Utc.with_ymd_and_hms(2024, 3, 14, 9, 15, 2).unwrap();

    let first = sink.write_at(at, &sample_records(), None).await.unwrap();
    let second = sink.write_at(at, &[], None).await.unwrap();

    assert_ne!(first, second);
    assert!(second.to_string_lossy().ends_with("-1.json"));
    assert_eq!(load_document(&first).await.unwrap().count, 3);
    assert!(load_document(&second).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sink_written_file_uses_wire_names() {
    let temp_dir = TempDir::new().unwrap();
    let sink = JsonFileSink::new(temp_dir.path());

    let path = sink.write(&sample_records(), None).await.unwrap();
    let raw: serde_json::Value = load_json(&path).await.unwrap();

    assert!(raw["generatedAt"].is_string());
    assert!(raw["sourceUrl"].is_null());
    assert_eq!(raw["members"][0]["userID"], "123456789012345678");
    assert_eq!(raw["members"][0]["status"], "dnd");
    assert_eq!(raw["members"][1]["displayName"], "Unknown");
    assert!(raw["members"][1]["username"].is_null());
}

#[tokio::test]
async fn test_load_document_rejects_bad_count() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.json");

    let mut document = RosterDocument::new(sample_records(), None);
    document.count = 7;
    create_json(&path, &document).await.unwrap();

    let err = load_document(&path).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidDocument(_)));
}

#[tokio::test]
async fn test_load_document_rejects_malformed_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("truncated.json");
    tokio::fs::write(&path, r#"{"count": 1, "members": ["#).await.unwrap();

    let err = load_document(&path).await.unwrap_err();
    assert!(matches!(err, StoreError::Serialization(_)));
}
