//! Typed endpoints of the calendar backend
//!
//! One method per REST operation. Paths are relative to the configured base
//! URL and every payload is unwrapped from the response envelope by
//! [`ApiClient`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use smartcal_core::{AssistantGateway, SpeechGateway};
use smartcal_domain::{
    AudioClip, AuthResponse, ChatRequest, ChatResponse, DeleteEventResponse, EventDraft,
    EventItem, EventList, EventListQuery, EventPatch, LoginRequest, MarkAllReadResponse,
    NotificationItem, NotificationQuery, OperationLog, OperationLogQuery, PageQuery, PageResult,
    PasswordReset, ProfileUpdate, RegisterRequest, SpeechResult, SpeechTask, UnreadCount,
    UploadedFile, User, UserSearchQuery, UserStatus, UserStatusUpdate,
};
use tracing::{debug, instrument};
use urlencoding::encode;

use super::client::ApiClient;
use super::errors::ApiError;

/// Calendar backend operations
pub struct CalendarApi {
    client: Arc<ApiClient>,
}

impl CalendarApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    // === Account ===

    /// Create an account and receive its first token
    ///
    /// # Errors
    ///
    /// Returns error if API request fails
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.client.post("/auth/register", request).await
    }

    /// Exchange credentials for a token
    ///
    /// # Errors
    ///
    /// Returns error if the credentials are rejected or the request fails
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let response: AuthResponse = self.client.post("/auth/login", request).await?;

        debug!(user_id = response.user.id, "Logged in");
        Ok(response)
    }

    /// # Errors
    ///
    /// Returns error if API request fails
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<User, ApiError> {
        self.client.get("/user/profile").await
    }

    /// # Errors
    ///
    /// Returns error if API request fails
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.client.put("/user/profile", update).await
    }

    /// Upload an avatar image and receive its public URL
    ///
    /// # Errors
    ///
    /// Returns error if the MIME type is malformed or the upload fails
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_avatar(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        mime_type: &str,
    ) -> Result<UploadedFile, ApiError> {
        let form = file_form(bytes, file_name, mime_type)?;
        self.client.post_multipart("/upload/avatar", form).await
    }

    /// # Errors
    ///
    /// Returns error if API request fails
    #[instrument(skip(self), fields(keyword = %query.keyword))]
    pub async fn search_users(&self, query: &UserSearchQuery) -> Result<PageResult<User>, ApiError> {
        self.client.get_with_query("/users/search", query).await
    }

    // === Events ===

    /// # Errors
    ///
    /// Returns error if API request fails
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create_event(&self, draft: &EventDraft) -> Result<EventItem, ApiError> {
        let event: EventItem = self.client.post("/events", draft).await?;

        debug!(event_id = event.id, "Event created");
        Ok(event)
    }

    /// List events visible to the current user
    ///
    /// # Errors
    ///
    /// Returns error if API request fails
    #[instrument(skip(self, query))]
    pub async fn list_events(&self, query: &EventListQuery) -> Result<Vec<EventItem>, ApiError> {
        let response: EventList = self.client.get_with_query("/events", query).await?;

        debug!(count = response.list.len(), "Events listed");
        Ok(response.list)
    }

    /// # Errors
    ///
    /// Returns error if the event does not exist or the request fails
    #[instrument(skip(self))]
    pub async fn event(&self, id: i64) -> Result<EventItem, ApiError> {
        self.client.get(&format!("/events/{}", id)).await
    }

    /// # Errors
    ///
    /// Returns error if API request fails
    #[instrument(skip(self, patch))]
    pub async fn update_event(&self, id: i64, patch: &EventPatch) -> Result<EventItem, ApiError> {
        self.client.put(&format!("/events/{}", id), patch).await
    }

    /// # Errors
    ///
    /// Returns error if API request fails
    #[instrument(skip(self))]
    pub async fn delete_event(&self, id: i64) -> Result<bool, ApiError> {
        let response: DeleteEventResponse = self.client.delete(&format!("/events/{}", id)).await?;
        Ok(response.deleted)
    }

    // === Activity ===

    /// # Errors
    ///
    /// Returns error if API request fails
    #[instrument(skip(self, query))]
    pub async fn operation_logs(
        &self,
        query: &OperationLogQuery,
    ) -> Result<PageResult<OperationLog>, ApiError> {
        self.client.get_with_query("/operation-logs", query).await
    }

    /// # Errors
    ///
    /// Returns error if API request fails
    #[instrument(skip(self, query))]
    pub async fn notifications(
        &self,
        query: &NotificationQuery,
    ) -> Result<PageResult<NotificationItem>, ApiError> {
        self.client.get_with_query("/notifications", query).await
    }

    /// # Errors
    ///
    /// Returns error if API request fails
    #[instrument(skip(self))]
    pub async fn unread_count(&self) -> Result<u64, ApiError> {
        let response: UnreadCount = self.client.get("/notifications/unread-count").await?;
        Ok(response.count)
    }

    /// # Errors
    ///
    /// Returns error if API request fails
    #[instrument(skip(self))]
    pub async fn mark_read(&self, id: i64) -> Result<NotificationItem, ApiError> {
        self.client.put_empty(&format!("/notifications/{}/read", id)).await
    }

    /// Mark every notification read; returns how many changed
    ///
    /// # Errors
    ///
    /// Returns error if API request fails
    #[instrument(skip(self))]
    pub async fn mark_all_read(&self) -> Result<u64, ApiError> {
        let response: MarkAllReadResponse = self.client.put_empty("/notifications/read-all").await?;
        Ok(response.updated)
    }

    // === Assistant ===

    /// Send one turn to the assistant
    ///
    /// # Errors
    ///
    /// Returns error if API request fails
    #[instrument(skip(self, request), fields(confirm = request.is_confirmation()))]
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        let response: ChatResponse = self.client.post("/ai/chat", request).await?;

        debug!(status = ?response.status, intent = %response.intent, "Chat turn answered");
        Ok(response)
    }

    /// Upload a recording for asynchronous recognition
    ///
    /// # Errors
    ///
    /// Returns error if the upload fails
    #[instrument(skip(self, clip), fields(size = clip.len(), mime = %clip.mime_type))]
    pub async fn submit_speech(&self, clip: AudioClip) -> Result<SpeechTask, ApiError> {
        let AudioClip { bytes, mime_type, file_name } = clip;
        let form = file_form(bytes, &file_name, &mime_type)?;
        let task: SpeechTask = self.client.post_multipart("/ai/speech", form).await?;

        debug!(task_id = %task.task_id, "Speech task accepted");
        Ok(task)
    }

    /// # Errors
    ///
    /// Returns error if API request fails
    #[instrument(skip(self))]
    pub async fn speech_result(&self, task_id: &str) -> Result<SpeechResult, ApiError> {
        let path = format!("/ai/speech/{}", encode(task_id));
        self.client.get(&path).await
    }

    // === Administration ===

    /// # Errors
    ///
    /// Returns error if the caller is not an administrator or the request fails
    #[instrument(skip(self))]
    pub async fn admin_users(&self, page: PageQuery) -> Result<PageResult<User>, ApiError> {
        self.client.get_with_query("/admin/users", &page).await
    }

    /// # Errors
    ///
    /// Returns error if the caller is not an administrator or the request fails
    #[instrument(skip(self))]
    pub async fn set_user_status(&self, user_id: i64, status: UserStatus) -> Result<User, ApiError> {
        let path = format!("/admin/users/{}/status", user_id);
        self.client.put(&path, &UserStatusUpdate { status }).await
    }

    /// Issue a temporary password for a user
    ///
    /// # Errors
    ///
    /// Returns error if the caller is not an administrator or the request fails
    #[instrument(skip(self))]
    pub async fn reset_password(&self, user_id: i64) -> Result<PasswordReset, ApiError> {
        let path = format!("/admin/users/{}/reset-password", user_id);
        self.client.put_empty(&path).await
    }
}

fn file_form(bytes: Vec<u8>, file_name: &str, mime_type: &str) -> Result<Form, ApiError> {
    let part = Part::bytes(bytes)
        .file_name(file_name.to_string())
        .mime_str(mime_type)
        .map_err(|e| ApiError::Config(format!("Invalid MIME type {}: {}", mime_type, e)))?;
    Ok(Form::new().part("file", part))
}

#[async_trait]
impl AssistantGateway for CalendarApi {
    async fn chat(&self, request: ChatRequest) -> smartcal_domain::Result<ChatResponse> {
        Ok(CalendarApi::chat(self, &request).await?)
    }
}

#[async_trait]
impl SpeechGateway for CalendarApi {
    async fn submit_speech(&self, clip: AudioClip) -> smartcal_domain::Result<SpeechTask> {
        Ok(CalendarApi::submit_speech(self, clip).await?)
    }

    async fn speech_result(&self, task_id: &str) -> smartcal_domain::Result<SpeechResult> {
        Ok(CalendarApi::speech_result(self, task_id).await?)
    }
}
