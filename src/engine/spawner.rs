//! Engine process spawner.
//!
//! Launches the engine as `engine <source> <data> <stack> <instructions>`
//! with all three stdio streams piped and `kill_on_drop(true)`, so an engine
//! can never outlive the handle that owns it.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tracing::info;

use crate::config::GlobalConfig;
use crate::{AppError, Result};

/// Everything needed to launch one engine process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnConfig {
    /// Engine executable.
    pub engine_path: PathBuf,
    /// Working directory for the engine.
    pub work_dir: PathBuf,
    /// Submitted program file.
    pub source: PathBuf,
    /// Data memory dump file.
    pub data: PathBuf,
    /// Stack memory dump file.
    pub stack: PathBuf,
    /// Instruction memory dump file.
    pub instructions: PathBuf,
}

impl SpawnConfig {
    /// Derive the spawn parameters from global configuration.
    #[must_use]
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self {
            engine_path: config.engine_path(),
            work_dir: config.work_dir.clone(),
            source: config.source_path(),
            data: config.data_path(),
            stack: config.stack_path(),
            instructions: config.instructions_path(),
        }
    }

    /// Positional arguments in the order the engine expects them.
    #[must_use]
    pub fn args(&self) -> [&PathBuf; 4] {
        [&self.source, &self.data, &self.stack, &self.instructions]
    }
}

/// A freshly spawned engine with its stdio streams detached.
///
/// The caller is responsible for keeping `child` alive (it has
/// `kill_on_drop(true)`) and for draining both output streams.
#[derive(Debug)]
pub struct EngineProcess {
    /// Child process handle.
    pub child: Child,
    /// Engine stdin, for single-character commands.
    pub stdin: ChildStdin,
    /// Engine stdout: log lines and register snapshots.
    pub stdout: ChildStdout,
    /// Engine stderr: diagnostics.
    pub stderr: ChildStderr,
}

/// Spawn an engine process.
///
/// # Errors
///
/// - `AppError::Spawn("failed to spawn engine …")`: the executable is
///   missing or not runnable.
/// - `AppError::Spawn("failed to capture engine …")`: a stdio pipe was not
///   set up.
pub fn spawn_engine(config: &SpawnConfig) -> Result<EngineProcess> {
    let mut cmd = Command::new(&config.engine_path);
    cmd.args(config.args())
        .current_dir(&config.work_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|err| {
        AppError::Spawn(format!(
            "failed to spawn engine {}: {err}",
            config.engine_path.display()
        ))
    })?;

    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| AppError::Spawn("failed to capture engine stdin".into()))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| AppError::Spawn("failed to capture engine stdout".into()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| AppError::Spawn("failed to capture engine stderr".into()))?;

    info!(
        pid = child.id(),
        engine = %config.engine_path.display(),
        "engine process spawned"
    );

    Ok(EngineProcess {
        child,
        stdin,
        stdout,
        stderr,
    })
}
