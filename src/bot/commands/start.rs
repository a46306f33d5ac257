use anyhow::Result;
use teloxide::prelude::*;

use crate::database::connection::DatabaseManager;
use crate::database::models::{Invite, Setting, User};
use crate::games::GamePlayer;
use crate::utils::validation::validate_invite_code;

const WELCOME: &str = "🎮 Welcome to Group Games Bot!\n\n\
Play in your group chat and collect points:\n\
/quiz — trivia questions\n\
/movie — guess the movie from emojis\n\
/emoji — what comes next in the pattern?\n\
/charades — act it out, let the group guess\n\
/bingo — classic bingo with DM'd cards\n\n\
/leaderboard shows the standings, /invite earns you points for new players.\n\
Use /help for the full command list.";

pub async fn handle_start(
    bot: &Bot,
    msg: &Message,
    payload: &str,
    db: &DatabaseManager,
) -> Result<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let player = GamePlayer::from(user);
    let payload = payload.trim();

    if payload.is_empty() {
        register(db, &player, None).await?;
        bot.send_message(msg.chat.id, WELCOME).await?;
        return Ok(());
    }

    // Deep-link payloads are invite codes.
    let code = match validate_invite_code(payload) {
        Ok(code) => code,
        Err(e) => {
            register(db, &player, None).await?;
            bot.send_message(msg.chat.id, format!("⚠️ That invite code doesn't look right: {e}"))
                .await?;
            bot.send_message(msg.chat.id, WELCOME).await?;
            return Ok(());
        }
    };

    // Only genuinely new users can be invited.
    if User::find(&db.pool, player.id).await?.is_some() {
        register(db, &player, None).await?;
        bot.send_message(
            msg.chat.id,
            "You're already registered, so the invite code was ignored. Welcome back! 👋",
        )
        .await?;
        return Ok(());
    }

    match Invite::redeem(&db.pool, &code, player.id).await? {
        Some(inviter_id) => {
            register(db, &player, Some(inviter_id)).await?;
            let enabled = Setting::get_bool(&db.pool, "invitation_enabled", true).await?;
            let bonus = Setting::get_i64(&db.pool, "invitation_points", 5).await?;
            bot.send_message(
                msg.chat.id,
                format!("🎉 Invite accepted — welcome aboard, {}!", player.first_name),
            )
            .await?;
            let inviter_note = if enabled && bonus > 0 {
                format!(
                    "🎉 {} joined with your invite! You earned {bonus} points.",
                    player.first_name
                )
            } else {
                format!("🎉 {} joined with your invite!", player.first_name)
            };
            // Best effort; the inviter may have blocked the bot.
            let _ = bot.send_message(ChatId(inviter_id), inviter_note).await;
            bot.send_message(msg.chat.id, WELCOME).await?;
        }
        None => {
            register(db, &player, None).await?;
            bot.send_message(
                msg.chat.id,
                "⚠️ That invite code is unknown, already used, or your own.",
            )
            .await?;
            bot.send_message(msg.chat.id, WELCOME).await?;
        }
    }

    Ok(())
}

async fn register(
    db: &DatabaseManager,
    player: &GamePlayer,
    invited_by: Option<i64>,
) -> Result<(), sqlx::Error> {
    User::register(
        &db.pool,
        player.id,
        player.username.clone(),
        Some(player.first_name.clone()),
        player.last_name.clone(),
        invited_by,
    )
    .await
}
