//! Session control API: operations and their HTTP surface.

pub mod command;
pub mod controller;
pub mod refresh;
pub mod routes;

pub use command::ControlCommand;
pub use controller::{ExecutionStatus, SessionController};
pub use refresh::RefreshStrategy;
