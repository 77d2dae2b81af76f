//! Builders for wire payloads used across the suites.

use chrono::{DateTime, FixedOffset};
use smartcal_domain::{
    Candidate, ChatResponse, ChatStatus, User, UserRole, UserStatus,
};

pub fn ts(raw: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(raw).unwrap()
}

pub fn candidate(id: i64, title: &str) -> Candidate {
    Candidate {
        id,
        title: title.to_string(),
        start_time: ts("2026-10-19T15:00:00+08:00"),
        end_time: ts("2026-10-19T16:00:00+08:00"),
        location: String::new(),
    }
}

pub fn success(result: &str) -> ChatResponse {
    ChatResponse {
        status: ChatStatus::Success,
        intent: "create".to_string(),
        result: result.to_string(),
        confirm_id: None,
        candidates: Vec::new(),
        proposal: None,
        event: None,
    }
}

pub fn need_confirm(result: &str, confirm_id: &str, candidates: Vec<Candidate>) -> ChatResponse {
    ChatResponse {
        status: ChatStatus::NeedConfirm,
        intent: "update".to_string(),
        result: result.to_string(),
        confirm_id: Some(confirm_id.to_string()),
        candidates,
        proposal: None,
        event: None,
    }
}

pub fn user(id: i64, role: UserRole) -> User {
    User {
        id,
        nickname: "小王".to_string(),
        email: "wang@example.com".to_string(),
        avatar: None,
        role,
        status: UserStatus::Active,
        created_at: ts("2026-03-01T09:00:00+08:00"),
        updated_at: ts("2026-03-01T09:00:00+08:00"),
    }
}
