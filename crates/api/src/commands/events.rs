//! Calendar event commands

use smartcal_domain::{EventDraft, EventItem, EventListQuery, EventPatch, Result as DomainResult};

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

pub async fn list_events(ctx: &AppContext, query: EventListQuery) -> DomainResult<Vec<EventItem>> {
    execute_command(ctx, "events::list_events", || async {
        Ok(ctx.api.list_events(&query).await?)
    })
    .await
}

pub async fn get_event(ctx: &AppContext, id: i64) -> DomainResult<EventItem> {
    execute_command(ctx, "events::get_event", || async { Ok(ctx.api.event(id).await?) }).await
}

pub async fn create_event(ctx: &AppContext, draft: EventDraft) -> DomainResult<EventItem> {
    execute_command(ctx, "events::create_event", || async {
        Ok(ctx.api.create_event(&draft).await?)
    })
    .await
}

pub async fn update_event(ctx: &AppContext, id: i64, patch: EventPatch) -> DomainResult<EventItem> {
    execute_command(ctx, "events::update_event", || async {
        Ok(ctx.api.update_event(id, &patch).await?)
    })
    .await
}

pub async fn delete_event(ctx: &AppContext, id: i64) -> DomainResult<bool> {
    execute_command(ctx, "events::delete_event", || async { Ok(ctx.api.delete_event(id).await?) })
        .await
}
