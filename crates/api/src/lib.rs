//! # SmartCal App
//!
//! Application layer - commands and the `smartcal` binary.
//!
//! This crate contains:
//! - Commands (thin async wrappers with structured command logging)
//! - Application context (dependency injection)
//! - Logging setup
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture
//! - Turns transport auth failures into a "sign-in required" flag

pub mod commands;
pub mod context;
pub mod utils;

pub use commands::*;
pub use context::*;
