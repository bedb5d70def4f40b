//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Message returned to clients when a control command arrives with no engine.
pub const NOT_RUNNING_MESSAGE: &str = "Simulator is not running. Submit code first.";

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// A control command was sent while no engine process is held.
    EngineNotRunning,
    /// A control command outside the accepted set (`N`, `R`, `E`).
    InvalidCommand(String),
    /// A structured-looking engine output line failed to parse.
    Parse(String),
    /// The engine executable could not be started.
    Spawn(String),
    /// A memory snapshot file could not be read.
    FileRead(String),
    /// HTTP transport failure (bind, serve, or client request).
    Http(String),
    /// File-system or I/O operation failure.
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::EngineNotRunning => write!(f, "engine not running"),
            Self::InvalidCommand(cmd) => write!(f, "invalid command: {cmd}"),
            Self::Parse(msg) => write!(f, "parse: {msg}"),
            Self::Spawn(msg) => write!(f, "spawn: {msg}"),
            Self::FileRead(msg) => write!(f, "file read: {msg}"),
            Self::Http(msg) => write!(f, "http: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
