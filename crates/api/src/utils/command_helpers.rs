//! Command execution helpers
//!
//! Provides utilities to reduce boilerplate when implementing commands with
//! timing, logging and session bookkeeping.

use std::future::Future;
use std::time::Instant;

use smartcal_domain::{Result as DomainResult, SmartCalError};

use crate::context::AppContext;
use crate::utils::logging::log_command_execution;

/// Execute a command with automatic timing and logging
///
/// A rejected session (`SmartCalError::Unauthenticated`) also flags the
/// context as requiring sign-in, so the caller sees the change as soon as
/// the command returns rather than when the broadcast listener runs.
///
/// # Example
///
/// ```rust,ignore
/// pub async fn unread_count(ctx: &AppContext) -> DomainResult<u64> {
///     execute_command(ctx, "notifications::unread_count", || async {
///         Ok(ctx.api.unread_count().await?)
///     })
///     .await
/// }
/// ```
pub async fn execute_command<F, Fut, T>(
    ctx: &AppContext,
    command_name: &str,
    command_fn: F,
) -> DomainResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();

    let result = command_fn().await;

    if let Err(SmartCalError::Unauthenticated { .. }) = &result {
        ctx.mark_login_required();
    }

    let error_type = result.as_ref().err().map(SmartCalError::label);
    log_command_execution(command_name, start.elapsed(), error_type);

    result
}
