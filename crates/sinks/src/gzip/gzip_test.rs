//! Tests for GzipSink

use std::io::Read;

use flate2::read::MultiGzDecoder;

use jot_core::{Payload, Sink};

use crate::load::read_entries;

use super::GzipSink;

fn decompress(path: &std::path::Path) -> String {
    let file = std::fs::File::open(path).unwrap();
    let mut out = String::new();
    MultiGzDecoder::new(file).read_to_string(&mut out).unwrap();
    out
}

#[test]
fn test_lines_survive_compression() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.jsonl.gz");

    let mut sink = GzipSink::create(&path).unwrap();
    sink.emit(Payload::Wire(r#"{"i":1}"#)).unwrap();
    sink.emit(Payload::Wire(r#"{"i":2}"#)).unwrap();
    sink.close().unwrap();

    assert_eq!(decompress(&path), "{\"i\":1}\n{\"i\":2}\n");
}

#[test]
fn test_sessions_append_as_gzip_members() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.jsonl.gz");

    let mut first = GzipSink::create(&path).unwrap();
    first.emit(Payload::Wire(r#"{"session":1}"#)).unwrap();
    first.close().unwrap();

    let mut second = GzipSink::create(&path).unwrap();
    second.emit(Payload::Wire(r#"{"session":2}"#)).unwrap();
    second.close().unwrap();

    assert_eq!(decompress(&path), "{\"session\":1}\n{\"session\":2}\n");

    let entries = read_entries(&path).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].get("session"), Some(&serde_json::json!(2)));
}

#[test]
fn test_close_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = GzipSink::create(dir.path().join("run.jsonl.gz")).unwrap();

    sink.emit(Payload::Wire("{}")).unwrap();
    sink.close().unwrap();
    sink.close().unwrap();
    assert!(sink.emit(Payload::Wire("{}")).is_err());
}
