//! Engine control commands accepted by `POST /control`.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::config::GlobalConfig;
use crate::api::RefreshStrategy;
use crate::AppError;

/// A command forwarded to the engine's stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Execute one step (`N`).
    Step,
    /// Run to completion (`R`).
    Run,
    /// Stop the engine (`E`).
    Exit,
}

impl ControlCommand {
    /// The single-character wire form sent to the engine.
    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Step => "N",
            Self::Run => "R",
            Self::Exit => "E",
        }
    }

    /// How state is refreshed after this command has been forwarded.
    #[must_use]
    pub fn refresh_strategy(self, config: &GlobalConfig) -> RefreshStrategy {
        match self {
            Self::Step | Self::Exit => RefreshStrategy::AfterDelay(config.step_refresh_delay()),
            Self::Run => RefreshStrategy::UntilComplete {
                poll_interval: config.run_poll_interval(),
            },
        }
    }
}

impl FromStr for ControlCommand {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "N" => Ok(Self::Step),
            "R" => Ok(Self::Run),
            "E" => Ok(Self::Exit),
            other => Err(AppError::InvalidCommand(other.to_owned())),
        }
    }
}

impl Display for ControlCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}
