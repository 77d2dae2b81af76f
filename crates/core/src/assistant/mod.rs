//! Natural-language assistant: chat turns, confirmations and voice input

pub mod conversation;
pub mod input;
pub mod ports;

pub use conversation::{Conversation, TurnState, TurnStatus};
pub use input::AiInput;
