//! # SmartCal Domain
//!
//! Domain types and models for the SmartCal calendar client.
//!
//! This crate contains:
//! - Wire types for the calendar REST API (users, events, notifications,
//!   operation logs, assistant chat turns, speech tasks)
//! - The uniform response envelope
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other SmartCal crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
