//! Shared test helpers for `smartcal-core` integration tests.
//!
//! In-memory fakes for every core port so the state machines can be driven
//! deterministically, with paused tokio time where spacing matters.

#![allow(dead_code)]

pub mod assistant;
pub mod audio;
pub mod fixtures;
pub mod tokens;
