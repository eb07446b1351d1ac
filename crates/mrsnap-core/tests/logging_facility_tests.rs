#![allow(clippy::unwrap_used, clippy::expect_used)]

use mrsnap_core::core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use mrsnap_core::errors::{ExError, ExErrorKind};
use mrsnap_core::logging_facility::test_capture::init_test_capture;
use mrsnap_core::{log_op_end, log_op_error, log_op_start, parse_manifest};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, project = "build");

    assert_eq!(capture.count(op_name, EVENT_START), 1);
    let start = &capture.events_for(op_name)[0];
    assert_eq!(start.field("project"), Some("build"));
}

#[test]
fn test_log_op_end_records_duration() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42u64);

    let events = capture.events_for(op_name);
    let end_event = events
        .iter()
        .find(|e| e.event() == Some(EVENT_END))
        .expect("end event");
    assert_eq!(end_event.field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = ExError::new(ExErrorKind::CacheCorrupt).with_message("bad json");
    log_op_error!(op_name, &err, duration_ms = 10u64);

    let events = capture.events_for(op_name);
    let error_event = events
        .iter()
        .find(|e| e.event() == Some(EVENT_END_ERROR))
        .expect("error event");
    assert_eq!(error_event.field("err_code"), Some("ERR_CACHE_CORRUPT"));
    assert_eq!(error_event.level, tracing::Level::ERROR);
}

#[test]
fn test_manifest_parse_emits_boundaries() {
    let capture = init_test_capture();
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("logged.xml"),
        r#"<manifest><project name="a" path="a"/></manifest>"#,
    )
    .unwrap();

    parse_manifest(dir.path(), "logged.xml").unwrap();

    capture.assert_event_exists("parse_manifest", EVENT_START);
    capture.assert_event_exists("parse_manifest", EVENT_END);
}

#[test]
fn test_manifest_parse_logs_each_file_path() {
    let capture = init_test_capture();
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("outer_unique.xml"),
        r#"<manifest><include name="inner_unique.xml"/></manifest>"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("inner_unique.xml"),
        r#"<manifest><project name="b"/></manifest>"#,
    )
    .unwrap();

    parse_manifest(dir.path(), "outer_unique.xml").unwrap();

    let parsed: Vec<String> = capture
        .events()
        .iter()
        .filter_map(|e| e.field("manifest").map(str::to_string))
        .collect();
    assert!(parsed.iter().any(|p| p.ends_with("outer_unique.xml")), "{:?}", parsed);
    assert!(parsed.iter().any(|p| p.ends_with("inner_unique.xml")), "{:?}", parsed);
}
