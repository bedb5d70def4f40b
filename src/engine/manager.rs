//! Engine process manager.
//!
//! Owns the lifecycle of the one current engine process: persisting the
//! submitted source, replacing the previous engine, wiring up the reader,
//! writer and monitor tasks, forwarding commands, and termination.

use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::GlobalConfig;
use crate::engine::monitor::{monitor_exit, MonitorConfig};
use crate::engine::reader::{run_reader, OutputStream};
use crate::engine::spawner::{spawn_engine, EngineProcess, SpawnConfig};
use crate::engine::writer::run_writer;
use crate::engine::EngineHandle;
use crate::session::{Session, SessionStore};
use crate::{AppError, Result};

/// Capacity of the per-engine command queue.
const COMMAND_QUEUE: usize = 16;

/// Manages the external engine process for the current session.
#[derive(Debug)]
pub struct EngineManager {
    spawn_config: SpawnConfig,
    drain_timeout: Duration,
    store: SessionStore,
    /// Serialises `start` so two submissions never interleave.
    lifecycle: Mutex<()>,
}

impl EngineManager {
    /// Create a manager reporting into `store`.
    #[must_use]
    pub fn new(config: &GlobalConfig, store: SessionStore) -> Self {
        Self {
            spawn_config: SpawnConfig::from_config(config),
            drain_timeout: config.drain_timeout(),
            store,
            lifecycle: Mutex::new(()),
        }
    }

    /// The store this manager reports into.
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Persist `source`, replace any running engine with a fresh one, and
    /// start a new session for it. Returns the new session generation.
    ///
    /// Does not wait for the previous engine to finish draining; its tasks
    /// are cancelled and anything they still deliver is dropped.
    ///
    /// # Errors
    ///
    /// - `AppError::Io`: the source file could not be written; the current
    ///   session is left untouched.
    /// - `AppError::Spawn`: the engine could not be started; the previous
    ///   engine is still terminated and the session is left idle.
    pub async fn start(&self, source: &str) -> Result<u64> {
        let _guard = self.lifecycle.lock().await;

        let source_path = &self.spawn_config.source;
        tokio::fs::write(source_path, source).await.map_err(|err| {
            AppError::Io(format!("failed to write {}: {err}", source_path.display()))
        })?;
        debug!(path = %source_path.display(), bytes = source.len(), "source persisted");

        if let Some(previous) = self.store.update(Session::reset_idle) {
            info!(pid = previous.pid, "terminating previous engine");
            previous.cancel.cancel();
        }

        let EngineProcess {
            child,
            stdin,
            stdout,
            stderr,
        } = spawn_engine(&self.spawn_config).map_err(|err| {
            error!(%err, "engine start failed");
            err
        })?;

        let cancel = CancellationToken::new();
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_QUEUE);
        let handle = EngineHandle {
            commands: cmd_tx,
            cancel: cancel.clone(),
            pid: child.id(),
        };

        let (generation, previous) = self.store.update(|session| session.install(handle));
        if let Some(previous) = previous {
            previous.cancel.cancel();
        }

        let writer_cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = run_writer(generation, stdin, cmd_rx, writer_cancel).await {
                warn!(generation, %err, "engine writer stopped");
            }
        });

        let stdout_reader = tokio::spawn(run_reader(
            generation,
            OutputStream::Stdout,
            stdout,
            self.store.clone(),
            cancel.clone(),
        ));
        let stderr_reader = tokio::spawn(run_reader(
            generation,
            OutputStream::Stderr,
            stderr,
            self.store.clone(),
            cancel.clone(),
        ));

        drop(monitor_exit(
            MonitorConfig {
                generation,
                drain_timeout: self.drain_timeout,
            },
            child,
            vec![stdout_reader, stderr_reader],
            self.store.clone(),
            cancel,
        ));

        info!(generation, "engine session started");
        Ok(generation)
    }

    /// Queue `command` for the engine's stdin.
    ///
    /// # Errors
    ///
    /// Returns `AppError::EngineNotRunning` if no engine is held or the
    /// engine has stopped accepting input.
    pub async fn send(&self, command: &str) -> Result<()> {
        let sender = self
            .store
            .read(|session| session.engine().map(|engine| engine.commands.clone()))
            .ok_or(AppError::EngineNotRunning)?;

        sender
            .send(command.to_owned())
            .await
            .map_err(|_| AppError::EngineNotRunning)?;
        debug!(command, "command queued for engine");
        Ok(())
    }

    /// Whether the current session's engine has exited.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.store.read(Session::is_complete)
    }

    /// Terminate the current engine, if any. The session completes.
    pub fn terminate(&self) {
        if let Some(engine) = self.store.update(Session::detach) {
            info!(pid = engine.pid, "terminating engine");
            engine.cancel.cancel();
        }
    }
}
