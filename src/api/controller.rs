//! Session control operations.
//!
//! [`SessionController`] turns client requests into engine manager actions
//! and session store reads. HTTP handlers in [`routes`](super::routes) are
//! thin wrappers around it.

use std::sync::Arc;

use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, info_span, Instrument};

use crate::api::{ControlCommand, RefreshStrategy};
use crate::config::GlobalConfig;
use crate::engine::EngineManager;
use crate::engine::classifier::looks_structured;
use crate::models::execution::ExecutionState;
use crate::models::memory::MemorySnapshot;
use crate::models::register::Register;
use crate::session::memory::MemoryFiles;
use crate::session::{Session, SessionStore};
use crate::{AppError, Result};

/// Payload of `GET /execution-status`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStatus {
    /// Whether the engine of the current session has exited.
    pub execution_complete: bool,
    /// Lifecycle state of the current session.
    pub state: ExecutionState,
    /// Engine exit code, once known; `None` for signals and running engines.
    pub exit_code: Option<i32>,
}

/// Owner of the engine manager and the session store.
#[derive(Debug)]
pub struct SessionController {
    config: Arc<GlobalConfig>,
    manager: EngineManager,
    store: SessionStore,
    memory_files: MemoryFiles,
}

impl SessionController {
    /// Build a controller with an idle session.
    #[must_use]
    pub fn new(config: Arc<GlobalConfig>) -> Self {
        let store = SessionStore::new(config.log_capacity);
        let manager = EngineManager::new(&config, store.clone());
        let memory_files = MemoryFiles::from_config(&config);
        Self {
            config,
            manager,
            store,
            memory_files,
        }
    }

    /// The session store backing this controller.
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    /// Start a new session running `code`, replacing the current one.
    ///
    /// Returns once the engine has been spawned; it does not wait for the
    /// engine to finish.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the source file cannot be written and
    /// `AppError::Spawn` if the engine cannot be started.
    pub async fn submit(&self, code: &str) -> Result<u64> {
        let generation = self.manager.start(code).await?;
        self.refresh(generation).await;
        info!(generation, bytes = code.len(), "code submitted");
        Ok(generation)
    }

    /// Forward a control command to the engine and schedule the matching
    /// refresh.
    ///
    /// # Errors
    ///
    /// - `AppError::InvalidCommand`: `raw` is not `N`, `R` or `E`.
    /// - `AppError::EngineNotRunning`: no engine is held.
    pub async fn control(self: &Arc<Self>, raw: &str) -> Result<ControlCommand> {
        let command: ControlCommand = raw.parse()?;

        let generation = self
            .store
            .read(|session| session.engine().map(|_| session.generation()))
            .ok_or(AppError::EngineNotRunning)?;

        if command == ControlCommand::Run {
            self.store
                .update_if_current(generation, |session| session.set_suppress(true));
        }

        if let Err(err) = self.manager.send(command.as_wire()).await {
            if command == ControlCommand::Run {
                self.store
                    .update_if_current(generation, |session| session.set_suppress(false));
            }
            return Err(err);
        }

        let strategy = command.refresh_strategy(&self.config);
        let this = Arc::clone(self);
        let span = info_span!("refresh", generation, %command);
        tokio::spawn(
            async move {
                this.run_refresh(generation, strategy).await;
            }
            .instrument(span),
        );

        info!(generation, %command, "control command forwarded");
        Ok(command)
    }

    /// Carry out `strategy` for the session `generation`.
    ///
    /// Becomes a no-op as soon as a newer submission replaces the session.
    pub async fn run_refresh(&self, generation: u64, strategy: RefreshStrategy) {
        match strategy {
            RefreshStrategy::AfterDelay(delay) => {
                tokio::time::sleep(delay).await;
                self.refresh(generation).await;
            }
            RefreshStrategy::UntilComplete { poll_interval } => {
                let mut ticker = tokio::time::interval(poll_interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    let (current, complete) = self
                        .store
                        .read(|session| (session.generation(), session.is_complete()));
                    if current != generation {
                        debug!("session superseded while waiting for run to finish");
                        return;
                    }
                    if complete {
                        break;
                    }
                }
                self.store.update_if_current(generation, Session::finish_run);
                self.refresh(generation).await;
            }
        }
    }

    /// Re-read the memory files into the session `generation`.
    ///
    /// Returns `false` when the session was replaced in the meantime.
    pub async fn refresh(&self, generation: u64) -> bool {
        let memory = self.memory_files.load().await;
        let applied = self
            .store
            .update_if_current(generation, |session| session.apply_refresh(memory))
            .is_some();
        debug!(generation, applied, "memory and registers refreshed");
        applied
    }

    /// The visible register file, always 32 entries ordered by id.
    #[must_use]
    pub fn query_registers(&self) -> Vec<Register> {
        self.store.read(|session| session.registers().to_vec())
    }

    /// The latest memory dump contents.
    #[must_use]
    pub fn query_memory(&self) -> MemorySnapshot {
        self.store.read(|session| session.memory().clone())
    }

    /// The trailing log window, without any snapshot-shaped lines.
    #[must_use]
    pub fn query_logs(&self) -> Vec<String> {
        self.store.read(|session| {
            session
                .logs()
                .iter()
                .filter(|line| !looks_structured(line))
                .map(str::to_owned)
                .collect()
        })
    }

    /// Completion flag of the current session.
    #[must_use]
    pub fn query_execution_status(&self) -> bool {
        self.manager.is_complete()
    }

    /// Completion flag plus lifecycle state and exit code.
    #[must_use]
    pub fn execution_status(&self) -> ExecutionStatus {
        self.store.read(|session| ExecutionStatus {
            execution_complete: session.is_complete(),
            state: session.state(),
            exit_code: session.exit().and_then(|exit| exit.code),
        })
    }

    /// Terminate the current engine, if any.
    pub fn shutdown(&self) {
        self.manager.terminate();
    }
}
