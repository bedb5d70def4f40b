//! Session state shared by the engine output path and the HTTP API.

pub mod log_buffer;
pub mod memory;
pub mod store;

pub use log_buffer::LogBuffer;
pub use store::{Session, SessionStore};
