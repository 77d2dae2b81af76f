//! # SmartCal Core
//!
//! Client-side business logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for the token store, the assistant and speech
//!   endpoints, audio capture and the calendar refresh signal
//! - The session (token + current user)
//! - The assistant conversation state machine with its confirm protocol
//! - The voice capture, upload and polling sub-flow
//!
//! ## Architecture Principles
//! - Only depends on `smartcal-domain`
//! - No HTTP, keychain or audio device code
//! - All external dependencies via traits
//! - State lives behind short-lived locks that are never held across `.await`

pub mod assistant;
pub mod auth;
pub mod voice;

pub use assistant::ports::{AssistantGateway, EventRefresh};
pub use assistant::{AiInput, Conversation, TurnState, TurnStatus};
pub use auth::ports::TokenStore;
pub use auth::Session;
pub use voice::ports::{AudioCapture, AudioInput, SpeechGateway};
pub use voice::{DeviceLease, PollPolicy, VoiceOutcome, VoiceRecorder, VoiceState, VoiceStatus};
