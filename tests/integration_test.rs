use lock_timeline::timeline::{MERGED_LABEL, Viewport, ZoomDirection, build_recording};
use lock_timeline::trace::{check_trace, load_trace_file};
use lock_timeline::{EntryType, ProtocolEntry, Session, TimelineConfig, TraceSource};
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const TRACE: &str = r#"[
    {"time": 0, "lockerId": 1, "type": "RequestWrite", "extraInfo": "{\"eventId\":\"abc-123-xyz\",\"eventType\":\"X\"}"},
    {"time": 100, "lockerId": 1, "type": "WriteGranted", "extraInfo": "/p h1"},
    {"time": 300, "lockerId": 1, "type": "Unlocked"},
    {"time": 200, "lockerId": 2, "type": 0, "extraInfo": "{\"eventId\":\"abc-123-xyz\",\"eventType\":\"Y\"}"},
    {"time": 400, "lockerId": 2, "type": 2, "extraInfo": "/p h2"},
    {"time": 500, "lockerId": 2, "type": 9},
    {"time": 250, "lockerId": 3, "type": 0, "extraInfo": "noise"},
    {"time": 260, "lockerId": 3, "type": 9}
]"#;

fn trace_file(text: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_trace_file() {
    let file = trace_file(TRACE);
    let entries = load_trace_file(file.path()).unwrap();

    assert_eq!(entries.len(), 8);
    assert_eq!(entries[0].entry_type, EntryType::RequestWrite);
    assert_eq!(entries[2].entry_type, EntryType::Unlocked);
    assert_eq!(entries[3].entry_type, EntryType::RequestRead);
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = load_trace_file(dir.path().join("missing.json")).unwrap_err();
    assert!(err.to_string().contains("missing.json"));
}

#[test]
fn test_session_from_file() {
    let file = trace_file(TRACE);
    let mut session = Session::default();
    session
        .load_source(TraceSource::File(file.path().to_path_buf()))
        .unwrap();

    // Locker 3 has only two entries and is dropped
    let ids: Vec<u64> = session.recording().lockers.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![1, 2]);

    // Both lockers belong to the same transaction
    let lockers = &session.recording().lockers;
    assert_eq!(lockers[0].row, lockers[1].row);
    assert_eq!(lockers[0].label, "abc-123- X");
    assert_eq!(lockers[1].label, MERGED_LABEL);
    assert_eq!(lockers[1].info, "abc-123- Y");
}

#[test]
fn test_sanity_report_from_file() {
    let file = trace_file(TRACE);
    let report = check_trace(&load_trace_file(file.path()).unwrap());

    assert_eq!(report.checked_lockers, 3);
    assert_eq!(report.inconsistencies.len(), 1);
    assert_eq!(report.inconsistencies[0].path, "/p");
    assert_eq!(report.inconsistencies[0].expected_hash, "h1");
    assert_eq!(report.inconsistencies[0].actual_hash, "h2");
}

#[test]
fn test_undefined_read_never_reports() {
    let entries = vec![
        ProtocolEntry::new(0.0, 1, EntryType::WriteGranted).with_info("/p h1"),
        ProtocolEntry::new(1.0, 1, EntryType::ReadGranted).with_info("/p undefined"),
        ProtocolEntry::new(2.0, 1, EntryType::Unlocked),
    ];
    assert!(check_trace(&entries).is_clean());
}

#[test]
fn test_viewport_clamp() {
    let entries = vec![
        ProtocolEntry::new(0.0, 1, EntryType::RequestRead),
        ProtocolEntry::new(500.0, 1, EntryType::ReadGranted),
        ProtocolEntry::new(1000.0, 1, EntryType::Unlocked),
    ];
    let config = TimelineConfig::default().with_viewport(100.0, 600.0);
    let recording = build_recording(&entries, &config);
    assert_eq!(recording.begin, 0.0);
    assert_eq!(recording.end, 1000.0);
    assert_eq!(recording.duration, 1200.0);

    let mut viewport = Viewport::fit(&recording, &config);
    viewport.scale_x = 1.0;

    viewport.pan_to(-500.0, &recording);
    assert_eq!(viewport.visible_time_start, 0.0);

    viewport.pan_to(2000.0, &recording);
    assert_eq!(viewport.visible_time_start, 900.0);
}

#[test]
fn test_zoom_keeps_anchor_time() {
    let file = trace_file(TRACE);
    let mut session = Session::new(TimelineConfig::default().with_viewport(1000.0, 600.0));
    session
        .load_source(TraceSource::File(file.path().to_path_buf()))
        .unwrap();

    for anchor in [250.0, 700.0] {
        session.zoom(ZoomDirection::In, anchor);
        let before = session.viewport().x_to_time(anchor);
        session.zoom(ZoomDirection::In, anchor);
        let after = session.viewport().x_to_time(anchor);
        assert!((before - after).abs() < 1e-6, "{} != {}", before, after);
    }
}

#[test]
fn test_filter_round_trip() {
    let file = trace_file(TRACE);
    let mut session = Session::default();
    session
        .load_source(TraceSource::File(file.path().to_path_buf()))
        .unwrap();
    let ids = |s: &Session| s.visible_tracks().iter().map(|l| l.id).collect::<Vec<_>>();
    let before = ids(&session);

    session.add_filter("h2");
    assert_eq!(ids(&session), vec![2]);

    session.remove_filter(0);
    assert_eq!(ids(&session), before);
}

#[test]
fn test_drop_file() {
    let dir = TempDir::new().unwrap();
    let notes = dir.path().join("notes.txt");
    fs::write(&notes, TRACE).unwrap();

    let mut session = Session::default();
    assert!(!session.drop_file(&notes).unwrap());
    assert!(!session.has_data());
    assert!(session.frame().placeholder);

    let trace = dir.path().join("trace.json");
    fs::write(&trace, TRACE).unwrap();
    assert!(session.drop_file(&trace).unwrap());
    assert_eq!(session.trace().len(), 8);
    assert!(!session.frame().placeholder);
}

#[test]
fn test_malformed_drop_keeps_trace() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.json");
    let bad = dir.path().join("bad.json");
    fs::write(&good, TRACE).unwrap();
    fs::write(&bad, "[{\"time\": 1, \"lockerId\": 1, \"type\": 99}]").unwrap();

    let mut session = Session::default();
    session.drop_file(&good).unwrap();
    assert!(session.drop_file(&bad).is_err());
    assert_eq!(session.trace().len(), 8);
    assert_eq!(session.recording().lockers.len(), 2);
}

#[test]
fn test_reload_picks_up_changes() {
    let file = trace_file(TRACE);
    let mut session = Session::default();
    session
        .load_source(TraceSource::File(file.path().to_path_buf()))
        .unwrap();
    assert_eq!(session.recording().lockers.len(), 2);

    let extended = TRACE.replace(
        r#"{"time": 260, "lockerId": 3, "type": 9}"#,
        r#"{"time": 260, "lockerId": 3, "type": 3}, {"time": 270, "lockerId": 3, "type": 9}"#,
    );
    fs::write(file.path(), extended).unwrap();

    assert!(session.reload().unwrap());
    assert_eq!(session.recording().lockers.len(), 3);
    assert_eq!(session.trace().len(), 9);
}
