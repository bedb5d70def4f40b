#![forbid(unsafe_code)]

//! Execution session controller for a step-through simulator console.
//!
//! Runs an external simulator engine per submitted program, parses its
//! output into register state and a trailing log window, reads back its
//! memory dumps, and serves all of it over a small HTTP/JSON API.

pub mod api;
pub mod config;
pub mod engine;
pub mod errors;
pub mod models;
pub mod session;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
