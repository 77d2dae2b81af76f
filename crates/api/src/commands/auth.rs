//! Sign-in, registration and session commands

use smartcal_domain::{LoginRequest, RegisterRequest, Result as DomainResult, User};
use tracing::info;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Sign in and persist the returned token.
pub async fn login(ctx: &AppContext, email: &str, password: &str) -> DomainResult<User> {
    execute_command(ctx, "auth::login", || async {
        let request = LoginRequest { email: email.to_string(), password: password.to_string() };
        let response = ctx.api.login(&request).await?;
        ctx.session.set_auth(&response.token, response.user.clone())?;
        ctx.clear_login_required();
        Ok(response.user)
    })
    .await
}

/// Create an account; the new user is signed in straight away.
pub async fn register(ctx: &AppContext, request: RegisterRequest) -> DomainResult<User> {
    execute_command(ctx, "auth::register", || async {
        let response = ctx.api.register(&request).await?;
        ctx.session.set_auth(&response.token, response.user.clone())?;
        ctx.clear_login_required();
        info!(user_id = response.user.id, "Account registered");
        Ok(response.user)
    })
    .await
}

pub async fn logout(ctx: &AppContext) -> DomainResult<()> {
    execute_command(ctx, "auth::logout", || async {
        ctx.ai_input.close_voice();
        ctx.ai_input.conversation().reset();
        ctx.session.logout()
    })
    .await
}

/// The signed-in user, fetching the profile once after a restart.
///
/// Returns `None` without touching the network when no token is stored.
pub async fn current_user(ctx: &AppContext) -> DomainResult<Option<User>> {
    execute_command(ctx, "auth::current_user", || async {
        if !ctx.session.is_authenticated() {
            return Ok(None);
        }
        if let Some(user) = ctx.session.user() {
            return Ok(Some(user));
        }
        let user = ctx.api.profile().await?;
        ctx.session.set_user(user.clone());
        Ok(Some(user))
    })
    .await
}
