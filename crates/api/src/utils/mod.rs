//! Shared helpers for commands and the binary

pub mod command_helpers;
pub mod logging;
