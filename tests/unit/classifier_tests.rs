//! Unit tests for engine output classification.

use simdeck::engine::classifier::{classify, looks_structured, parse_snapshot, OutputLine};
use simdeck::models::register::Register;

// ── Snapshots ────────────────────────────────────────────────

#[test]
fn snapshot_line_yields_registers_in_order() {
    let line = r#"{"registers":[{"id":0,"value":5},{"id":2,"value":-3}]}"#;

    assert_eq!(
        classify(line),
        OutputLine::Snapshot(vec![
            Register { id: 0, value: 5 },
            Register { id: 2, value: -3 },
        ])
    );
}

#[test]
fn whitespace_padded_snapshot_is_recognised() {
    let line = "   {\"registers\":[{\"id\":7,\"value\":1}]}  ";

    assert_eq!(
        classify(line),
        OutputLine::Snapshot(vec![Register { id: 7, value: 1 }])
    );
}

#[test]
fn empty_snapshot_is_still_a_snapshot() {
    assert_eq!(
        classify(r#"{"registers":[]}"#),
        OutputLine::Snapshot(Vec::new())
    );
}

#[test]
fn full_register_file_round_trips() {
    let registers: Vec<Register> = (0..32)
        .map(|id| Register {
            id,
            value: i64::from(id) * 4,
        })
        .collect();
    let line = serde_json::json!({ "registers": registers }).to_string();

    assert_eq!(classify(&line), OutputLine::Snapshot(registers));
}

// ── Log lines ────────────────────────────────────────────────

#[test]
fn plain_text_is_a_log_line() {
    assert_eq!(
        classify("Cycle 4: fetch 0x00500093"),
        OutputLine::Log("Cycle 4: fetch 0x00500093".to_owned())
    );
}

#[test]
fn malformed_structured_line_falls_back_to_raw_log() {
    let line = "{\"registers\":[{\"id\":0,\"value\":}]}";

    assert_eq!(classify(line), OutputLine::Log(line.to_owned()));
}

#[test]
fn malformed_structured_line_is_a_parse_error() {
    let result = parse_snapshot("{not json}");
    assert!(matches!(result, Err(simdeck::AppError::Parse(_))));
}

#[test]
fn unstructured_line_parses_to_none() {
    assert!(matches!(parse_snapshot("hello"), Ok(None)));
}

#[test]
fn looks_structured_requires_both_braces() {
    assert!(looks_structured("{}"));
    assert!(!looks_structured("{"));
    assert!(!looks_structured("value }"));
    assert!(!looks_structured(""));
}
