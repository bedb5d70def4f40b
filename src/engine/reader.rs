//! Engine output reader tasks.
//!
//! Each engine gets one reader on stdout and one on stderr. Stdout lines are
//! classified into register snapshots and log lines; stderr lines are
//! logged with an `[ERROR] ` prefix. Every update is applied through
//! [`SessionStore::update_if_current`], so output that is still in flight
//! after a resubmission never touches the new session.

use futures_util::StreamExt;
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::engine::classifier::{classify, OutputLine};
use crate::engine::codec::EngineCodec;
use crate::session::SessionStore;

/// Prefix applied to stderr lines stored in the log buffer.
pub const STDERR_PREFIX: &str = "[ERROR] ";

/// Which engine stream a reader drains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    /// Log lines interleaved with register snapshots.
    Stdout,
    /// Diagnostics only.
    Stderr,
}

impl OutputStream {
    fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// Apply one stdout line to the session for `generation`.
///
/// Blank lines are ignored. Returns `false` when the session has moved on
/// to a newer generation and the line was dropped.
pub fn apply_stdout_line(store: &SessionStore, generation: u64, line: &str) -> bool {
    if line.trim().is_empty() {
        return true;
    }

    let output = classify(line);
    store
        .update_if_current(generation, |session| match output {
            OutputLine::Snapshot(registers) => session.apply_snapshot(registers),
            OutputLine::Log(text) => session.push_log(text),
        })
        .is_some()
}

/// Apply one stderr line to the session for `generation`.
///
/// Returns `false` when the line was dropped as stale.
pub fn apply_stderr_line(store: &SessionStore, generation: u64, line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return true;
    }

    warn!(generation, line = trimmed, "engine stderr");
    store
        .update_if_current(generation, |session| {
            session.push_log(format!("{STDERR_PREFIX}{trimmed}"));
        })
        .is_some()
}

/// Engine reader task. Drains one output stream into the session store.
///
/// Returns on EOF, on an unrecoverable I/O error, on cancellation, or as soon
/// as the session no longer belongs to `generation`.
pub async fn run_reader<R>(
    generation: u64,
    stream: OutputStream,
    source: R,
    store: SessionStore,
    cancel: CancellationToken,
) where
    R: AsyncRead + Unpin + Send,
{
    let mut framed = FramedRead::new(source, EngineCodec::new());
    let name = stream.as_str();

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                debug!(generation, stream = name, "engine reader: cancellation received, stopping");
                break;
            }

            item = framed.next() => {
                match item {
                    None => {
                        debug!(generation, stream = name, "engine reader: EOF detected");
                        break;
                    }

                    Some(Err(err)) => {
                        warn!(generation, stream = name, %err, "engine reader: IO error, stopping");
                        break;
                    }

                    Some(Ok(line)) => {
                        let applied = match stream {
                            OutputStream::Stdout => apply_stdout_line(&store, generation, &line),
                            OutputStream::Stderr => apply_stderr_line(&store, generation, &line),
                        };
                        if !applied {
                            debug!(generation, stream = name, "engine reader: session superseded, stopping");
                            break;
                        }
                    }
                }
            }
        }
    }

    let discarded = framed.decoder().discarded();
    if discarded > 0 {
        warn!(generation, stream = name, discarded, "engine reader: over-long lines were dropped");
    }
}
