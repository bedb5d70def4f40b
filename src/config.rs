//! Global configuration parsing and validation.

use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::{AppError, Result};

/// File names the engine is launched with, relative to the work directory.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    /// Submitted program text, rewritten on every submission.
    #[serde(default = "default_source_file")]
    pub source: PathBuf,
    /// Data memory dump written by the engine.
    #[serde(default = "default_data_file")]
    pub data: PathBuf,
    /// Stack memory dump written by the engine.
    #[serde(default = "default_stack_file")]
    pub stack: PathBuf,
    /// Instruction memory dump written by the engine.
    #[serde(default = "default_instructions_file")]
    pub instructions: PathBuf,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            source: default_source_file(),
            data: default_data_file(),
            stack: default_stack_file(),
            instructions: default_instructions_file(),
        }
    }
}

fn default_source_file() -> PathBuf {
    PathBuf::from("input.mc")
}

fn default_data_file() -> PathBuf {
    PathBuf::from("data.mc")
}

fn default_stack_file() -> PathBuf {
    PathBuf::from("stack.mc")
}

fn default_instructions_file() -> PathBuf {
    PathBuf::from("instruction.mc")
}

/// Refresh cadence and shutdown timing (milliseconds).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TimingConfig {
    /// Delay between a STEP/EXIT command and the follow-up refresh.
    #[serde(default = "default_step_refresh_ms")]
    pub step_refresh_ms: u64,
    /// Completion poll interval while a RUN is outstanding.
    #[serde(default = "default_run_poll_ms")]
    pub run_poll_ms: u64,
    /// Upper bound on waiting for output to drain after the engine exits.
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            step_refresh_ms: default_step_refresh_ms(),
            run_poll_ms: default_run_poll_ms(),
            drain_timeout_ms: default_drain_timeout_ms(),
        }
    }
}

fn default_step_refresh_ms() -> u64 {
    500
}

fn default_run_poll_ms() -> u64 {
    500
}

fn default_drain_timeout_ms() -> u64 {
    2000
}

fn default_engine_path() -> PathBuf {
    PathBuf::from("./simulator")
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_http_port() -> u16 {
    5000
}

fn default_log_capacity() -> usize {
    50
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Engine executable; relative paths resolve against `work_dir`.
    #[serde(default = "default_engine_path")]
    pub engine_path: PathBuf,
    /// Directory holding the source and memory files.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    /// Interface the HTTP API binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,
    /// HTTP port for the API.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Number of trailing engine log lines retained.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
    /// Engine file arguments.
    #[serde(default)]
    pub files: FileConfig,
    /// Refresh cadence.
    #[serde(default)]
    pub timing: TimingConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            engine_path: default_engine_path(),
            work_dir: default_work_dir(),
            bind_address: default_bind_address(),
            http_port: default_http_port(),
            log_capacity: default_log_capacity(),
            files: FileConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and normalize paths.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Socket address the HTTP API listens on.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.http_port)
    }

    /// Absolute path of the engine executable.
    #[must_use]
    pub fn engine_path(&self) -> PathBuf {
        self.resolve(&self.engine_path)
    }

    /// Absolute path of the submitted source file.
    #[must_use]
    pub fn source_path(&self) -> PathBuf {
        self.resolve(&self.files.source)
    }

    /// Absolute path of the data memory file.
    #[must_use]
    pub fn data_path(&self) -> PathBuf {
        self.resolve(&self.files.data)
    }

    /// Absolute path of the stack memory file.
    #[must_use]
    pub fn stack_path(&self) -> PathBuf {
        self.resolve(&self.files.stack)
    }

    /// Absolute path of the instruction memory file.
    #[must_use]
    pub fn instructions_path(&self) -> PathBuf {
        self.resolve(&self.files.instructions)
    }

    /// Delay before the refresh that follows a STEP or EXIT command.
    #[must_use]
    pub fn step_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.timing.step_refresh_ms)
    }

    /// Completion poll interval while a RUN is outstanding.
    #[must_use]
    pub fn run_poll_interval(&self) -> Duration {
        Duration::from_millis(self.timing.run_poll_ms)
    }

    /// Maximum time spent draining engine output after exit.
    #[must_use]
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.timing.drain_timeout_ms)
    }

    /// Re-run validation after CLI overrides have been applied.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if any value is out of range or the work
    /// directory does not exist.
    pub fn validate(&mut self) -> Result<()> {
        if self.log_capacity == 0 {
            return Err(AppError::Config(
                "log_capacity must be greater than zero".into(),
            ));
        }

        if self.timing.run_poll_ms == 0 {
            return Err(AppError::Config(
                "timing.run_poll_ms must be greater than zero".into(),
            ));
        }

        let canonical_root = self
            .work_dir
            .canonicalize()
            .map_err(|err| AppError::Config(format!("work_dir invalid: {err}")))?;
        self.work_dir = canonical_root;

        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        }
    }
}
