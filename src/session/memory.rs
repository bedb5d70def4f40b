//! Reads the engine's memory dump files back into a [`MemorySnapshot`].
//!
//! The engine rewrites the data, stack and instruction files as a side
//! effect of stepping. They are re-read after every refresh; a missing or
//! unreadable file yields an empty segment and a warning.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::GlobalConfig;
use crate::models::memory::{parse_dump, MemoryEntry, MemorySnapshot};
use crate::{AppError, Result};

/// Locations of the three memory dump files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryFiles {
    /// Data segment dump.
    pub data: PathBuf,
    /// Stack segment dump.
    pub stack: PathBuf,
    /// Instruction segment dump.
    pub instructions: PathBuf,
}

impl MemoryFiles {
    /// Resolve the dump file paths from configuration.
    #[must_use]
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self {
            data: config.data_path(),
            stack: config.stack_path(),
            instructions: config.instructions_path(),
        }
    }

    /// Read all three segments, substituting an empty segment for any file
    /// that cannot be read.
    pub async fn load(&self) -> MemorySnapshot {
        MemorySnapshot {
            data: read_or_empty(&self.data).await,
            stack: read_or_empty(&self.stack).await,
            instructions: read_or_empty(&self.instructions).await,
        }
    }
}

/// Read and parse one memory dump file.
///
/// # Errors
///
/// Returns `AppError::FileRead` if the file is absent or unreadable.
pub async fn read_segment(path: &Path) -> Result<Vec<MemoryEntry>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| AppError::FileRead(format!("{}: {err}", path.display())))?;
    Ok(parse_dump(&text))
}

async fn read_or_empty(path: &Path) -> Vec<MemoryEntry> {
    match read_segment(path).await {
        Ok(entries) => {
            debug!(path = %path.display(), entries = entries.len(), "loaded memory file");
            entries
        }
        Err(err) => {
            warn!(%err, "memory file unavailable, using empty segment");
            Vec::new()
        }
    }
}
