use teloxide::prelude::*;
use tracing::warn;

use crate::database::connection::DatabaseManager;
use crate::database::models::UserActivity;
use crate::games::emoji_pattern;

/// Non-command messages: count the activity, then offer the message to
/// the emoji pattern round as a guess, then fall back to command hints.
pub async fn handle_general_message(
    bot: Bot,
    msg: Message,
    db: DatabaseManager,
) -> ResponseResult<()> {
    if let Some(user) = msg.from() {
        if let Err(e) = UserActivity::record(&db.pool, user.id.0 as i64, msg.chat.id.0).await {
            warn!("Activity tracking failed in chat {}: {}", msg.chat.id, e);
        }
    }

    match emoji_pattern::handle_message(&bot, &db, &msg).await {
        Ok(true) => return Ok(()),
        Ok(false) => {}
        Err(e) => {
            warn!("Emoji guess handling failed in chat {}: {:#}", msg.chat.id, e);
            return Ok(());
        }
    }

    if let Some(text) = msg.text() {
        if text.starts_with('/') {
            let unknown = text.split_whitespace().next().unwrap_or(text);
            bot.send_message(
                msg.chat.id,
                format!("Unknown command: {unknown}\nUse /help to see everything I can do."),
            )
            .await?;
        }
        // Anything else is normal conversation; stay quiet.
    }

    Ok(())
}
