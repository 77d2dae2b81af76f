//! Domain types and models
//!
//! Wire types exchanged with the calendar REST API. Field names follow the
//! backend's snake_case JSON.

pub mod assistant;
mod de;
pub mod envelope;
pub mod event;
pub mod notification;
pub mod operation_log;
pub mod speech;
pub mod user;

pub use assistant::{Candidate, ChatOutcome, ChatRequest, ChatResponse, ChatStatus, Proposal};
pub use envelope::{ApiEnvelope, PageQuery, PageResult};
pub use event::{
    DeleteEventResponse, EventDraft, EventItem, EventList, EventListQuery, EventParticipant,
    EventPatch, EventType,
};
pub use notification::{
    MarkAllReadResponse, NotificationItem, NotificationQuery, NotificationType, UnreadCount,
};
pub use operation_log::{OperationAction, OperationLog, OperationLogQuery};
pub use speech::{AudioClip, SpeechResult, SpeechStatus, SpeechTask};
pub use user::{
    AuthResponse, LoginRequest, PasswordReset, ProfileUpdate, RegisterRequest, UploadedFile, User,
    UserRole, UserSearchQuery, UserStatus, UserStatusUpdate,
};
