//! Tests for reading log files back

use std::fs;

use serde_json::json;

use jot_core::{Logger, Payload, Retention, Sink};

use crate::gzip::GzipSink;
use crate::load::{load, read_entries};

fn write_plain(dir: &tempfile::TempDir, lines: &[&str]) -> std::path::PathBuf {
    let path = dir.path().join("run.jsonl");
    fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}

#[test]
fn test_read_entries_plain() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(&dir, &[r#"{"i":1}"#, r#"{"i":2}"#]);

    let entries = read_entries(&path).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].get("i"), Some(&json!(1)));
}

#[test]
fn test_read_entries_gzip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.jsonl.gz");

    let mut sink = GzipSink::create(&path).unwrap();
    sink.emit(Payload::Wire(r#"{"i":1}"#)).unwrap();
    sink.close().unwrap();

    let entries = read_entries(&path).unwrap();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_read_entries_rejects_malformed_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(&dir, &[r#"{"i":1}"#, "not json"]);

    assert!(read_entries(&path).is_err());
}

#[test]
fn test_load_honors_retention() {
    let dir = tempfile::tempdir().unwrap();
    let lines: Vec<String> = (1..=5).map(|i| format!(r#"{{"i":{i}}}"#)).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let path = write_plain(&dir, &refs);

    let mut logger = Logger::new(Retention::Last(2));
    let total = load(&mut logger, &path).unwrap();

    assert_eq!(total, 5);
    assert_eq!(logger.len(), 2);
    assert_eq!(logger[0].get("i"), Some(&json!(4)));
    assert_eq!(logger[1].get("i"), Some(&json!(5)));
}

#[test]
fn test_load_with_retention_off_counts_but_keeps_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(&dir, &[r#"{"i":1}"#, r#"{"i":2}"#]);

    let mut logger = Logger::new(Retention::Off);
    let total = load(&mut logger, &path).unwrap();

    assert_eq!(total, 2);
    assert!(logger.is_empty());
}

#[test]
fn test_load_skips_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.jsonl");
    fs::write(&path, "{\"i\":1}\n\n{\"i\":2}\n").unwrap();

    let mut logger = Logger::new(Retention::Unbounded);
    assert_eq!(load(&mut logger, &path).unwrap(), 2);
    assert_eq!(logger.len(), 2);
}
