//! External engine process management.
//!
//! One engine process exists per submission. Its stdout and stderr are
//! drained by [`reader`] tasks, commands reach its stdin through the
//! [`writer`] task, and [`monitor`] detects exit. All of them report into the
//! [`SessionStore`](crate::session::SessionStore) tagged with the session
//! generation they were started for.

pub mod classifier;
pub mod codec;
pub mod manager;
pub mod monitor;
pub mod reader;
pub mod spawner;
pub mod writer;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub use manager::EngineManager;

/// Handle to a running engine held by the current session.
///
/// Dropping the handle closes the command channel, which ends the stdin
/// writer task. Cancelling the token stops all tasks for this engine and
/// kills the process.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    /// Outbound command channel to the stdin writer task.
    pub commands: mpsc::Sender<String>,
    /// Cancels every task belonging to this engine.
    pub cancel: CancellationToken,
    /// OS process id, when available.
    pub pid: Option<u32>,
}
