//! Memory snapshot types read back from the engine's dump files.

use serde::{Deserialize, Serialize};

/// One `address value` line from a memory dump file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryEntry {
    /// Address column, kept verbatim.
    pub address: String,
    /// Value column, kept verbatim; empty when the line has no second column.
    pub value: String,
}

/// Latest contents of the three memory segments.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemorySnapshot {
    /// Data segment.
    pub data: Vec<MemoryEntry>,
    /// Stack segment.
    pub stack: Vec<MemoryEntry>,
    /// Instruction segment.
    pub instructions: Vec<MemoryEntry>,
}

/// Parse the text of a memory dump file.
///
/// Blank lines are skipped; every other line is split on whitespace into
/// address and value, in file order.
#[must_use]
pub fn parse_dump(text: &str) -> Vec<MemoryEntry> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut cols = line.split_whitespace();
            MemoryEntry {
                address: cols.next().unwrap_or_default().to_owned(),
                value: cols.next().unwrap_or_default().to_owned(),
            }
        })
        .collect()
}
