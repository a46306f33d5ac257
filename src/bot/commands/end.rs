use anyhow::Result;
use teloxide::prelude::*;

use crate::database::connection::DatabaseManager;
use crate::database::models::GameSession;
use crate::games::GameType;
use crate::utils::authorization::can_manage_games;

/// `/end <game>`: force-end a stuck round. Ending the session row is
/// enough; every running timer reloads the session before acting and
/// drops out on its own.
pub async fn handle_end(bot: &Bot, msg: &Message, game_arg: &str, db: &DatabaseManager) -> Result<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };

    if !can_manage_games(bot, &db.pool, msg.chat.id, user).await? {
        bot.send_message(msg.chat.id, "🔒 Only admins can force-end games.")
            .await?;
        return Ok(());
    }

    let game_arg = game_arg.trim();
    if game_arg.is_empty() {
        bot.send_message(
            msg.chat.id,
            "Which game? Usage: /end quiz|movie|emoji|charades|bingo",
        )
        .await?;
        return Ok(());
    }

    let game_type: GameType = match game_arg.parse() {
        Ok(game_type) => game_type,
        Err(_) => {
            bot.send_message(
                msg.chat.id,
                format!("I don't know a game called \"{game_arg}\". Try quiz, movie, emoji, charades or bingo."),
            )
            .await?;
            return Ok(());
        }
    };

    if GameSession::get_active(&db.pool, msg.chat.id.0, game_type)
        .await?
        .is_none()
    {
        bot.send_message(
            msg.chat.id,
            format!("There is no {} running here.", game_type.display_name()),
        )
        .await?;
        return Ok(());
    }

    GameSession::end(&db.pool, msg.chat.id.0, game_type).await?;
    bot.send_message(
        msg.chat.id,
        format!("🛑 {} force-ended by an admin.", game_type.display_name()),
    )
    .await?;
    Ok(())
}
