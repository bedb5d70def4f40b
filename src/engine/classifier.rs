//! Engine output classification.
//!
//! The engine interleaves free-text progress lines with one-line JSON
//! register snapshots of the form
//! `{"registers":[{"id":0,"value":0},...]}`. Each stdout line is either one
//! or the other; nothing else on stdout is structured.

use serde::Deserialize;
use tracing::warn;

use crate::models::register::Register;
use crate::{AppError, Result};

/// Result of classifying one engine output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    /// A register snapshot, in the order the engine reported it.
    Snapshot(Vec<Register>),
    /// Any other line, kept verbatim.
    Log(String),
}

#[derive(Debug, Deserialize)]
struct SnapshotLine {
    registers: Vec<Register>,
}

/// Whether `line` has the outer shape of a JSON object line.
#[must_use]
pub fn looks_structured(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('{') && trimmed.ends_with('}')
}

/// Parse `line` as a register snapshot.
///
/// Returns `Ok(None)` for lines that do not look structured.
///
/// # Errors
///
/// Returns `AppError::Parse` when the line looks like a JSON object but is
/// not a valid snapshot.
pub fn parse_snapshot(line: &str) -> Result<Option<Vec<Register>>> {
    if !looks_structured(line) {
        return Ok(None);
    }

    let snapshot: SnapshotLine = serde_json::from_str(line.trim())
        .map_err(|err| AppError::Parse(format!("malformed register snapshot: {err}")))?;
    Ok(Some(snapshot.registers))
}

/// Classify one engine stdout line.
///
/// Structured-looking lines that fail to parse are logged and fall back to
/// [`OutputLine::Log`] with the raw text.
#[must_use]
pub fn classify(line: &str) -> OutputLine {
    match parse_snapshot(line) {
        Ok(Some(registers)) => OutputLine::Snapshot(registers),
        Ok(None) => OutputLine::Log(line.to_owned()),
        Err(err) => {
            warn!(%err, raw_line = line, "keeping unparseable snapshot as log line");
            OutputLine::Log(line.to_owned())
        }
    }
}
