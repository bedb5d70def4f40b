//! Engine stdin writer task.
//!
//! Receives commands from a tokio [`mpsc`] channel and writes each one to
//! the engine's stdin as a newline-terminated line.

use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::codec::Encoder;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::engine::codec::EngineCodec;
use crate::{AppError, Result};

/// Engine writer task. Forwards queued commands to `stdin`.
///
/// The task exits cleanly when `cancel` fires or when every sender has been
/// dropped (the session released its engine handle).
///
/// # Errors
///
/// Returns `AppError::Io("write failed: …")` if the engine closed its stdin,
/// typically because it already exited.
pub async fn run_writer<W>(
    generation: u64,
    stdin: W,
    mut cmd_rx: mpsc::Receiver<String>,
    cancel: CancellationToken,
) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut stdin = stdin;
    let mut codec = EngineCodec::new();
    let mut buf = BytesMut::new();

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                debug!(generation, "engine writer: cancellation received, stopping");
                break;
            }

            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    debug!(generation, "engine writer: command channel closed, stopping");
                    break;
                };

                buf.clear();
                codec.encode(cmd.as_str(), &mut buf)?;
                stdin.write_all(&buf).await.map_err(|err| {
                    warn!(generation, command = %cmd, %err, "engine writer: write to stdin failed");
                    AppError::Io(format!("write failed: {err}"))
                })?;
                stdin.flush().await.map_err(|err| AppError::Io(format!("flush failed: {err}")))?;
                debug!(generation, command = %cmd, "engine writer: command delivered");
            }
        }
    }

    Ok(())
}
