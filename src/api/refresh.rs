//! Refresh cadence after a control command.
//!
//! STEP and EXIT produce their output synchronously, so one refresh after a
//! short delay is enough. RUN may take arbitrarily long; its intermediate
//! snapshots stay hidden and a single refresh happens once the engine has
//! exited.

use std::time::Duration;

/// When memory and registers are re-read after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStrategy {
    /// Refresh once after a fixed delay.
    AfterDelay(Duration),
    /// Poll completion at a fixed interval, then finish the run and refresh
    /// once.
    UntilComplete {
        /// Time between completion checks.
        poll_interval: Duration,
    },
}
