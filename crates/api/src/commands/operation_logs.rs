use smartcal_domain::{OperationLog, OperationLogQuery, PageResult, Result as DomainResult};

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

pub async fn list_operation_logs(
    ctx: &AppContext,
    query: OperationLogQuery,
) -> DomainResult<PageResult<OperationLog>> {
    execute_command(ctx, "operation_logs::list_operation_logs", || async {
        Ok(ctx.api.operation_logs(&query).await?)
    })
    .await
}
