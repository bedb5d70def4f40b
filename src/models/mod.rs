//! Domain model module declarations.

pub mod execution;
pub mod memory;
pub mod register;
