//! Calendar event types

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;
use crate::types::de::lenient_option;
use crate::types::user::User;

/// Event category shown as a colour band in the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Work,
    Life,
    Growth,
    /// Any category this client does not know, e.g. one an assistant
    /// action stored verbatim
    #[serde(other)]
    Other,
}

impl_domain_status_conversions!(EventType {
    Work => "work",
    Life => "life",
    Growth => "growth",
    Other => "other",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventParticipant {
    pub user_id: i64,
    #[serde(default, deserialize_with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// Calendar event as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventItem {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub is_creator: bool,
    #[serde(default)]
    pub is_collaboration: bool,
    /// Absent when the backend did not load the creator
    #[serde(default, deserialize_with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub creator: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<EventParticipant>>,
}

/// Payload for creating an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    #[serde(default)]
    pub participant_ids: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial update for an existing event; absent fields are unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_ids: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Filters for the event listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventListQuery {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventList {
    pub list: Vec<EventItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteEventResponse {
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_event_with_type_field() {
        let json = r#"{
            "id": 12,
            "user_id": 1,
            "title": "产品评审会",
            "type": "work",
            "start_time": "2026-10-19T15:00:00+08:00",
            "end_time": "2026-10-19T16:00:00+08:00",
            "created_at": "2026-10-18T09:00:00+08:00",
            "updated_at": "2026-10-18T09:00:00+08:00",
            "is_creator": true,
            "is_collaboration": false,
            "participants": [{ "user_id": 2 }]
        }"#;
        let event: EventItem = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, EventType::Work);
        assert!(event.is_creator);
        assert_eq!(event.participants.unwrap()[0].user_id, 2);
    }

    #[test]
    fn patch_serializes_only_changed_fields() {
        let patch = EventPatch { title: Some("改期".into()), ..Default::default() };
        let json = serde_json::to_value(patch).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "改期" }));
    }

    #[test]
    fn list_query_uses_type_key() {
        let query = EventListQuery { event_type: Some(EventType::Growth), ..Default::default() };
        let json = serde_json::to_value(query).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "growth" }));
    }

    #[test]
    fn unknown_type_decodes_as_other() {
        let json = r#"{
            "id": 13,
            "user_id": 1,
            "title": "健身",
            "type": "exercise",
            "start_time": "2026-10-19T18:00:00+08:00",
            "end_time": "2026-10-19T19:00:00+08:00",
            "created_at": "2026-10-18T09:00:00+08:00",
            "updated_at": "2026-10-18T09:00:00+08:00",
            "creator": { "id": 0, "nickname": "", "email": "", "role": "", "status": "" }
        }"#;
        let event: EventItem = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, EventType::Other);
        assert_eq!(event.creator, None);
    }
}
