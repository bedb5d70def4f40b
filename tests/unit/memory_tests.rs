//! Unit tests for memory dump parsing and loading.

use simdeck::models::memory::{parse_dump, MemoryEntry};
use simdeck::session::memory::{read_segment, MemoryFiles};
use simdeck::AppError;

fn entry(address: &str, value: &str) -> MemoryEntry {
    MemoryEntry {
        address: address.to_owned(),
        value: value.to_owned(),
    }
}

#[test]
fn dump_lines_split_into_address_and_value() {
    let text = "0x10000000 0x00000005\n0x10000004 0x0000000a\n";

    assert_eq!(
        parse_dump(text),
        vec![
            entry("0x10000000", "0x00000005"),
            entry("0x10000004", "0x0000000a"),
        ]
    );
}

#[test]
fn blank_lines_are_skipped_and_whitespace_collapsed() {
    let text = "\n0x0   0x00500093\n   \n\t0x4\t0x00a00113\n";

    assert_eq!(
        parse_dump(text),
        vec![entry("0x0", "0x00500093"), entry("0x4", "0x00a00113")]
    );
}

#[test]
fn single_column_line_has_empty_value() {
    assert_eq!(parse_dump("0x7ffffff0\n"), vec![entry("0x7ffffff0", "")]);
}

#[test]
fn extra_columns_are_ignored() {
    assert_eq!(
        parse_dump("0x8 0x1 addi x1 x0 1\n"),
        vec![entry("0x8", "0x1")]
    );
}

#[tokio::test]
async fn read_segment_reports_missing_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let result = read_segment(&temp.path().join("data.mc")).await;

    assert!(matches!(result, Err(AppError::FileRead(msg)) if msg.contains("data.mc")));
}

#[tokio::test]
async fn load_substitutes_empty_segments_for_missing_files() {
    let temp = tempfile::tempdir().expect("tempdir");
    std::fs::write(temp.path().join("stack.mc"), "0x7ffffff0 0x0\n").expect("write stack");

    let files = MemoryFiles {
        data: temp.path().join("data.mc"),
        stack: temp.path().join("stack.mc"),
        instructions: temp.path().join("instruction.mc"),
    };
    let snapshot = files.load().await;

    assert!(snapshot.data.is_empty());
    assert_eq!(snapshot.stack, vec![entry("0x7ffffff0", "0x0")]);
    assert!(snapshot.instructions.is_empty());
}

#[test]
fn memory_files_follow_config() {
    let temp = tempfile::tempdir().expect("tempdir");
    let toml = format!("work_dir = '{}'", temp.path().display());
    let config = simdeck::config::GlobalConfig::from_toml_str(&toml).expect("config");

    let files = MemoryFiles::from_config(&config);
    assert_eq!(files.data, config.data_path());
    assert_eq!(files.stack, config.stack_path());
    assert_eq!(files.instructions, config.instructions_path());
}
