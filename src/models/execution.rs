//! Engine execution state and exit reporting.

use serde::Serialize;

/// Lifecycle of the current session's engine.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    /// No engine has been started yet, or the last start failed.
    #[default]
    Idle,
    /// An engine process is held and accepting commands.
    Running,
    /// The engine exited, cleanly or otherwise.
    Complete,
}

/// How the engine process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitInfo {
    /// Exit code; `None` when the process was ended by a signal.
    pub code: Option<i32>,
    /// Whether the process reported success.
    pub success: bool,
}

impl ExitInfo {
    /// Human-readable description used in log output.
    #[must_use]
    pub fn describe(&self) -> String {
        match self.code {
            Some(0) => "exited normally (code 0)".to_owned(),
            Some(code) => format!("exited with code {code}"),
            None => "terminated by signal".to_owned(),
        }
    }
}

impl From<std::process::ExitStatus> for ExitInfo {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
            success: status.success(),
        }
    }
}
