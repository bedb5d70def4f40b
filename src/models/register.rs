//! Register snapshot types.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Number of general-purpose registers the engine reports.
pub const REGISTER_COUNT: usize = 32;

/// A single register value as reported by the engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Register {
    /// Register index, `0..32`.
    pub id: u32,
    /// Register contents.
    pub value: i64,
}

/// The full, fixed-length register file served to clients.
///
/// Always holds exactly [`REGISTER_COUNT`] entries ordered by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile([Register; REGISTER_COUNT]);

impl RegisterFile {
    /// An all-zero register file.
    #[must_use]
    pub fn zeroed() -> Self {
        Self(std::array::from_fn(|idx| Register {
            id: u32::try_from(idx).unwrap_or(u32::MAX),
            value: 0,
        }))
    }

    /// Build a register file from one engine snapshot.
    ///
    /// The snapshot replaces everything: ids it does not mention are zero,
    /// not carried over from an earlier snapshot. Out-of-range ids are
    /// dropped and later duplicates win.
    #[must_use]
    pub fn from_snapshot(snapshot: &[Register]) -> Self {
        let mut file = Self::zeroed();
        for reg in snapshot {
            let slot = usize::try_from(reg.id)
                .ok()
                .and_then(|idx| file.0.get_mut(idx));
            match slot {
                Some(slot) => slot.value = reg.value,
                None => warn!(id = reg.id, "ignoring out-of-range register id"),
            }
        }
        file
    }

    /// All registers ordered by id.
    #[must_use]
    pub fn as_slice(&self) -> &[Register] {
        &self.0
    }

    /// Owned copy of the registers ordered by id.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Register> {
        self.0.to_vec()
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::zeroed()
    }
}
