//! Administrator commands
//!
//! Gated on the cached role before any request is made: a 40301 from the
//! backend would otherwise end the session.

use smartcal_domain::{
    PageQuery, PageResult, PasswordReset, Result as DomainResult, SmartCalError, User, UserStatus,
};

use crate::commands::auth::current_user;
use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

async fn require_admin(ctx: &AppContext) -> DomainResult<()> {
    match current_user(ctx).await? {
        Some(user) if user.is_admin() => Ok(()),
        Some(_) => Err(SmartCalError::Auth("administrator role required".into())),
        None => Err(SmartCalError::Auth("not signed in".into())),
    }
}

pub async fn list_users(ctx: &AppContext, page: PageQuery) -> DomainResult<PageResult<User>> {
    execute_command(ctx, "admin::list_users", || async {
        require_admin(ctx).await?;
        Ok(ctx.api.admin_users(page).await?)
    })
    .await
}

pub async fn set_user_status(
    ctx: &AppContext,
    user_id: i64,
    status: UserStatus,
) -> DomainResult<User> {
    execute_command(ctx, "admin::set_user_status", || async {
        require_admin(ctx).await?;
        Ok(ctx.api.set_user_status(user_id, status).await?)
    })
    .await
}

pub async fn reset_password(ctx: &AppContext, user_id: i64) -> DomainResult<PasswordReset> {
    execute_command(ctx, "admin::reset_password", || async {
        require_admin(ctx).await?;
        Ok(ctx.api.reset_password(user_id).await?)
    })
    .await
}
