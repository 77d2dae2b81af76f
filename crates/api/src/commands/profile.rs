//! Profile and user directory commands

use std::path::Path;

use smartcal_domain::{
    PageResult, ProfileUpdate, Result as DomainResult, SmartCalError, User, UserSearchQuery,
};

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

pub async fn get_profile(ctx: &AppContext) -> DomainResult<User> {
    execute_command(ctx, "profile::get_profile", || async {
        let user = ctx.api.profile().await?;
        ctx.session.set_user(user.clone());
        Ok(user)
    })
    .await
}

pub async fn update_profile(ctx: &AppContext, update: ProfileUpdate) -> DomainResult<User> {
    execute_command(ctx, "profile::update_profile", || async {
        let user = ctx.api.update_profile(&update).await?;
        ctx.session.set_user(user.clone());
        Ok(user)
    })
    .await
}

/// Upload an image file as the avatar and store its URL on the profile.
pub async fn upload_avatar(ctx: &AppContext, path: &Path) -> DomainResult<User> {
    execute_command(ctx, "profile::upload_avatar", || async {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            SmartCalError::InvalidInput(format!("cannot read {}: {}", path.display(), e))
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "avatar".to_string());

        let uploaded = ctx.api.upload_avatar(bytes, &file_name, image_mime(path)).await?;
        let update = ProfileUpdate { nickname: None, avatar: Some(uploaded.url) };
        let user = ctx.api.update_profile(&update).await?;
        ctx.session.set_user(user.clone());
        Ok(user)
    })
    .await
}

pub async fn search_users(ctx: &AppContext, keyword: &str) -> DomainResult<PageResult<User>> {
    execute_command(ctx, "profile::search_users", || async {
        Ok(ctx.api.search_users(&UserSearchQuery::new(keyword)).await?)
    })
    .await
}

fn image_mime(path: &Path) -> &'static str {
    let ext = path.extension().map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
