//! Application commands
//!
//! Thin async wrappers over the API client and the assistant flow. Each one
//! is timed and logged through [`crate::utils::command_helpers`].

pub mod admin;
pub mod assistant;
pub mod auth;
pub mod events;
pub mod notifications;
pub mod operation_logs;
pub mod profile;

pub use admin::{list_users, reset_password, set_user_status};
pub use assistant::{
    ask, confirm, select_candidate, start_voice, stop_voice, transcribe_voice, AssistantReply,
    NextStep,
};
pub use auth::{current_user, login, logout, register};
pub use events::{create_event, delete_event, get_event, list_events, update_event};
pub use notifications::{list_notifications, mark_all_read, mark_read, unread_count};
pub use operation_logs::list_operation_logs;
pub use profile::{get_profile, search_users, update_profile, upload_avatar};
