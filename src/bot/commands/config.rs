use anyhow::Result;
use teloxide::prelude::*;

use crate::database::connection::DatabaseManager;
use crate::database::models::{GameSettings, Setting};
use crate::utils::authorization::is_group_admin;
use crate::utils::logging::log_validation_error;
use crate::utils::validation::validate_setting;

/// `/config` lists the current settings; `/config <key> <value>` changes
/// one. Configured bot admins pass everywhere, group admins in their own
/// group.
pub async fn handle_config(
    bot: &Bot,
    msg: &Message,
    args: &str,
    db: &DatabaseManager,
) -> Result<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };

    let settings = GameSettings::load(&db.pool).await?;
    let allowed = settings.is_bot_admin(user.id.0 as i64)
        || is_group_admin(bot, msg.chat.id, user.id).await;
    if !allowed {
        bot.send_message(msg.chat.id, "🔒 Only admins can view or change settings.")
            .await?;
        return Ok(());
    }

    let args = args.trim();
    if args.is_empty() {
        let retry_timeout = Setting::get_i64(&db.pool, "retry_timeout_seconds", 5).await?;
        bot.send_message(msg.chat.id, render_settings(&settings, retry_timeout))
            .await?;
        return Ok(());
    }

    let Some((key, value)) = args.split_once(char::is_whitespace) else {
        bot.send_message(
            msg.chat.id,
            "Usage: /config <key> <value> — or just /config to list everything.",
        )
        .await?;
        return Ok(());
    };

    match validate_setting(key, value) {
        Ok(normalized) => {
            Setting::set(&db.pool, key, &normalized).await?;
            bot.send_message(msg.chat.id, format!("✅ {key} is now {normalized}."))
                .await?;
        }
        Err(e) => {
            log_validation_error(
                "config",
                key,
                value.trim(),
                &e.to_string(),
                user.username.as_deref().unwrap_or("unknown"),
                user.id.0 as i64,
                msg.chat.id.0,
            );
            bot.send_message(msg.chat.id, format!("⚠️ {e}")).await?;
        }
    }

    Ok(())
}

fn render_settings(settings: &GameSettings, retry_timeout: i64) -> String {
    format!(
        "⚙️ SETTINGS ⚙️\n\n\
         points_per_correct_answer: {}\n\
         invitation_points: {}\n\
         invitation_enabled: {}\n\
         max_game_duration_seconds: {}\n\
         game_frequency_minutes: {}\n\
         retry_timeout_seconds: {}\n\
         admin_ids: {:?}\n\
         game_chat_ids: {:?}\n\n\
         Change one with /config <key> <value>.",
        settings.base_points,
        settings.invitation_points,
        settings.invitation_enabled,
        settings.max_game_duration_secs,
        settings.game_frequency_minutes,
        retry_timeout,
        settings.admin_ids,
        settings.game_chat_ids,
    )
}
