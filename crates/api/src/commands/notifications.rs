use smartcal_domain::{NotificationItem, NotificationQuery, PageResult, Result as DomainResult};

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

pub async fn list_notifications(
    ctx: &AppContext,
    query: NotificationQuery,
) -> DomainResult<PageResult<NotificationItem>> {
    execute_command(ctx, "notifications::list_notifications", || async {
        Ok(ctx.api.notifications(&query).await?)
    })
    .await
}

pub async fn unread_count(ctx: &AppContext) -> DomainResult<u64> {
    execute_command(ctx, "notifications::unread_count", || async {
        Ok(ctx.api.unread_count().await?)
    })
    .await
}

pub async fn mark_read(ctx: &AppContext, id: i64) -> DomainResult<NotificationItem> {
    execute_command(ctx, "notifications::mark_read", || async { Ok(ctx.api.mark_read(id).await?) })
        .await
}

pub async fn mark_all_read(ctx: &AppContext) -> DomainResult<u64> {
    execute_command(ctx, "notifications::mark_all_read", || async {
        Ok(ctx.api.mark_all_read().await?)
    })
    .await
}
