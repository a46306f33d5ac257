use teloxide::prelude::*;
use teloxide::types::UserId;
use tracing::warn;

use crate::database::models::Setting;

/// Whether the user is on the configured `admin_ids` list.
pub async fn is_configured_admin(
    pool: &sqlx::SqlitePool,
    user_id: i64,
) -> Result<bool, sqlx::Error> {
    let admin_ids = Setting::get_id_list(pool, "admin_ids").await?;
    Ok(admin_ids.contains(&user_id))
}

/// Whether the user administers the Telegram group. A failed lookup
/// counts as "no" rather than blocking the command pipeline.
pub async fn is_group_admin(bot: &Bot, chat_id: ChatId, user_id: UserId) -> bool {
    match bot.get_chat_administrators(chat_id).await {
        Ok(admins) => admins.iter().any(|member| member.user.id == user_id),
        Err(e) => {
            warn!("Could not fetch administrators for chat {}: {}", chat_id, e);
            false
        }
    }
}

/// Admin-gated game management: configured bot admins pass everywhere,
/// group admins pass in their own group.
pub async fn can_manage_games(
    bot: &Bot,
    pool: &sqlx::SqlitePool,
    chat_id: ChatId,
    user: &teloxide::types::User,
) -> Result<bool, sqlx::Error> {
    if is_configured_admin(pool, user.id.0 as i64).await? {
        return Ok(true);
    }
    Ok(is_group_admin(bot, chat_id, user.id).await)
}
