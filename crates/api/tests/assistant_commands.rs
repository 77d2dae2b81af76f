//! End-to-end assistant turns through the application context.

mod support;

use serde_json::json;
use smartcal_core::TurnStatus;
use smartcal_lib::commands::{self, AssistantReply, NextStep};
use support::{context_for, event_json, fail, ok, signed_in_store};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn candidate(id: i64, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "start_time": "2026-05-07T15:00:00+08:00",
        "end_time": "2026-05-07T16:00:00+08:00",
        "location": null
    })
}

#[tokio::test]
async fn delete_with_selection_then_confirm_reloads_calendar() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ai/chat"))
        .and(body_json(json!({ "message": "删除明天的周会" })))
        .respond_with(ok(json!({
            "status": "need_confirm",
            "intent": "delete",
            "result": "找到 2 个匹配的日程，请选择",
            "confirm_id": "c-7",
            "candidates": [candidate(1, "周会"), candidate(2, "周会（产品）")],
            "proposal": null
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/ai/chat"))
        .and(body_json(json!({
            "message": "确认",
            "confirm_id": "c-7",
            "confirm": true,
            "event_id": 2
        })))
        .respond_with(ok(json!({
            "status": "success",
            "intent": "delete",
            "result": "已删除「周会（产品）」",
            "confirm_id": null,
            "candidates": null,
            "proposal": null
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(ok(json!({ "list": [event_json(1, "周会")] })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context_for(&server, signed_in_store("jwt")).await;

    let reply = commands::ask(&ctx, "删除明天的周会").await.unwrap();
    assert_eq!(reply.state.status, TurnStatus::NeedConfirm);
    assert!(reply.state.requires_selection());
    assert!(!reply.state.can_confirm());
    assert_eq!(reply.events, None);

    let state = commands::select_candidate(&ctx, 2).await.unwrap();
    assert!(state.can_confirm());

    let reply = commands::confirm(&ctx).await.unwrap();
    assert_eq!(reply.state.status, TurnStatus::Success);
    assert_eq!(reply.state.result, "已删除「周会（产品）」");
    assert_eq!(reply.state.confirm_id, None);
    assert_eq!(reply.events.map(|e| e.len()), Some(1));
    assert_eq!(ctx.calendar_revision(), 1);
}

#[tokio::test]
async fn selecting_unknown_candidate_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ai/chat"))
        .respond_with(ok(json!({
            "status": "need_confirm",
            "intent": "update",
            "result": "请选择",
            "confirm_id": "c-1",
            "candidates": [candidate(1, "a"), candidate(2, "b")]
        })))
        .mount(&server)
        .await;

    let ctx = context_for(&server, signed_in_store("jwt")).await;
    commands::ask(&ctx, "改一下").await.unwrap();

    assert!(commands::select_candidate(&ctx, 99).await.is_err());
}

#[tokio::test]
async fn backend_message_is_shown_on_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ai/chat"))
        .respond_with(fail(200, 40001, "暂不支持该操作"))
        .mount(&server)
        .await;

    let ctx = context_for(&server, signed_in_store("jwt")).await;
    let reply = commands::ask(&ctx, "帮我订机票").await.unwrap();

    assert_eq!(reply.state.status, TurnStatus::Error);
    assert_eq!(reply.state.result, "暂不支持该操作");
}

#[tokio::test]
async fn transport_failure_uses_fallback_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ai/chat"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let ctx = context_for(&server, signed_in_store("jwt")).await;
    let reply = commands::ask(&ctx, "明天下午三点开会").await.unwrap();

    assert_eq!(reply.state.status, TurnStatus::Error);
    assert_eq!(reply.state.result, "AI 服务异常");
}

#[tokio::test]
async fn blank_message_is_ignored() {
    let server = MockServer::start().await;
    let ctx = context_for(&server, signed_in_store("jwt")).await;

    let reply = commands::ask(&ctx, "   ").await.unwrap();

    assert!(reply.ignored);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn applied_update_with_partial_event_still_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ai/chat"))
        .and(body_json(json!({ "message": "把周会改到下午" })))
        .respond_with(ok(json!({
            "status": "need_confirm",
            "intent": "update",
            "result": "将修改「周会」，请确认",
            "confirm_id": "c-1",
            "candidates": [candidate(4, "周会")]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/ai/chat"))
        .and(body_json(json!({ "message": "确认", "confirm_id": "c-1", "confirm": true })))
        .respond_with(ok(json!({
            "status": "success",
            "intent": "update",
            "result": "日程已更新",
            "event": {
                "id": 4,
                "user_id": 1,
                "title": "周会",
                "type": "meeting",
                "start_time": "2026-05-07T15:00:00+08:00",
                "end_time": "2026-05-07T16:00:00+08:00",
                "created_at": "2026-05-01T09:00:00+08:00",
                "updated_at": "2026-05-07T10:00:00+08:00",
                "creator": {
                    "id": 0,
                    "nickname": "",
                    "email": "",
                    "role": "",
                    "status": "",
                    "created_at": "0001-01-01T00:00:00Z",
                    "updated_at": "0001-01-01T00:00:00Z"
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(ok(json!({ "list": [event_json(4, "周会")] })))
        .mount(&server)
        .await;

    let ctx = context_for(&server, signed_in_store("jwt")).await;
    commands::ask(&ctx, "把周会改到下午").await.unwrap();
    let reply = commands::confirm(&ctx).await.unwrap();

    assert_eq!(reply.state.status, TurnStatus::Success);
    assert_eq!(reply.state.result, "日程已更新");
    assert_eq!(ctx.calendar_revision(), 1);
    assert!(reply.events.is_some());
}

#[tokio::test]
async fn need_confirm_without_confirm_id_ends_the_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ai/chat"))
        .respond_with(ok(json!({
            "status": "need_confirm",
            "intent": "delete",
            "result": "匹配到多个日程，请指定日程ID后确认",
            "confirm_id": null,
            "candidates": [candidate(1, "周会"), candidate(2, "周会（产品）")]
        })))
        .mount(&server)
        .await;

    let ctx = context_for(&server, signed_in_store("jwt")).await;
    let reply = commands::ask(&ctx, "删除周会").await.unwrap();

    assert_eq!(reply.state.status, TurnStatus::NeedConfirm);
    assert_eq!(reply.next_step(), NextStep::Done);
}

#[tokio::test]
async fn next_step_follows_selection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ai/chat"))
        .respond_with(ok(json!({
            "status": "need_confirm",
            "intent": "delete",
            "result": "请选择",
            "confirm_id": "c-9",
            "candidates": [candidate(1, "a"), candidate(2, "b")]
        })))
        .mount(&server)
        .await;

    let ctx = context_for(&server, signed_in_store("jwt")).await;
    let reply = commands::ask(&ctx, "删除").await.unwrap();
    assert_eq!(reply.next_step(), NextStep::SelectCandidate);

    let state = commands::select_candidate(&ctx, 1).await.unwrap();
    let reply = AssistantReply { state, ignored: false, events: None };
    assert_eq!(reply.next_step(), NextStep::Confirm);
}
