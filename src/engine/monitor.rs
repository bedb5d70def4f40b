//! Engine exit monitor.
//!
//! Owns the engine's [`Child`]. When the process exits on its own, the
//! monitor waits (bounded) for the output readers to drain, so that the last
//! register snapshot is applied before completion becomes visible, then
//! marks the session complete. When the engine's token is cancelled it
//! terminates the process instead.

use std::time::Duration;

use futures_util::future::join_all;
use tokio::process::Child;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::models::execution::ExitInfo;
use crate::session::SessionStore;

/// Time a terminated engine gets to exit after SIGTERM before it is killed.
const TERM_GRACE: Duration = Duration::from_millis(500);

/// Settings for one exit monitor.
#[derive(Debug)]
pub struct MonitorConfig {
    /// Session generation the engine belongs to.
    pub generation: u64,
    /// Upper bound on waiting for the readers after exit.
    pub drain_timeout: Duration,
}

/// Spawn a background task that awaits engine exit and completes the
/// session.
///
/// `readers` are the engine's output reader tasks; they are awaited for at
/// most `drain_timeout` after exit. On cancellation the engine is terminated
/// and no completion is recorded beyond the exit status.
#[must_use]
pub fn monitor_exit(
    config: MonitorConfig,
    mut child: Child,
    readers: Vec<JoinHandle<()>>,
    store: SessionStore,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let MonitorConfig {
        generation,
        drain_timeout,
    } = config;

    tokio::spawn(async move {
        tokio::select! {
            result = child.wait() => {
                let exit = match result {
                    Ok(status) => Some(ExitInfo::from(status)),
                    Err(err) => {
                        warn!(generation, %err, "error waiting for engine process");
                        None
                    }
                };

                if tokio::time::timeout(drain_timeout, join_all(readers)).await.is_err() {
                    warn!(generation, ?drain_timeout, "engine output did not drain before timeout");
                }

                let status_text = exit
                    .as_ref()
                    .map_or_else(|| "status unknown".to_owned(), ExitInfo::describe);
                match store.update_if_current(generation, |session| session.mark_exited(exit)) {
                    Some(()) => info!(generation, status = %status_text, "engine process exited"),
                    None => debug!(generation, status = %status_text, "superseded engine exited"),
                }

                cancel.cancel();
            }
            () = cancel.cancelled() => {
                let exit = terminate_child(generation, &mut child).await;
                if let Some(exit) = exit {
                    store.update_if_current(generation, |session| session.record_exit(exit));
                }
                info!(generation, "engine process terminated");
            }
        }
    })
}

/// Ask the engine to stop, escalating to a kill after [`TERM_GRACE`].
async fn terminate_child(generation: u64, child: &mut Child) -> Option<ExitInfo> {
    send_sigterm(generation, child);

    match tokio::time::timeout(TERM_GRACE, child.wait()).await {
        Ok(Ok(status)) => return Some(ExitInfo::from(status)),
        Ok(Err(err)) => {
            warn!(generation, %err, "error waiting for terminated engine");
            return None;
        }
        Err(_elapsed) => {
            debug!(generation, "engine ignored SIGTERM, killing");
        }
    }

    if let Err(err) = child.kill().await {
        warn!(generation, %err, "failed to kill engine process");
        return None;
    }
    child.try_wait().ok().flatten().map(ExitInfo::from)
}

#[cfg(unix)]
fn send_sigterm(generation: u64, child: &Child) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id().and_then(|id| i32::try_from(id).ok()) else {
        return;
    };
    if let Err(err) = kill(Pid::from_raw(pid), Signal::SIGTERM) {
        debug!(generation, %err, "SIGTERM delivery failed");
    }
}

#[cfg(not(unix))]
fn send_sigterm(_generation: u64, _child: &Child) {}
