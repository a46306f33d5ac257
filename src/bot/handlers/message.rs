use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::bot::commands::{self, Command};
use crate::bot::handlers::TRANSIENT_ERROR_TEXT;
use crate::database::connection::DatabaseManager;
use crate::database::models::UserActivity;
use crate::games::{self, GameContext};
use crate::utils::authorization::can_manage_games;
use crate::utils::logging::{log_command_error, log_command_start, log_validation_error};
use crate::utils::validation::validate_bingo_minutes;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    db: DatabaseManager,
) -> ResponseResult<()> {
    let user_id = msg.from().map(|u| u.id.0 as i64).unwrap_or(0);
    let username = msg
        .from()
        .and_then(|u| u.username.clone())
        .unwrap_or_else(|| "unknown".to_string());
    let chat_id = msg.chat.id.0;
    let command_name = name_of(&cmd);

    log_command_start(command_name, &username, user_id, chat_id, None);

    if user_id != 0 {
        if let Err(e) = UserActivity::record(&db.pool, user_id, chat_id).await {
            tracing::warn!("Activity tracking failed in chat {}: {}", chat_id, e);
        }
    }

    if let Err(e) = dispatch(&bot, &msg, cmd, &db).await {
        // Infrastructure failures get logged in full; the chat only
        // hears that something went wrong.
        log_command_error(command_name, &username, user_id, chat_id, &format!("{e:#}"));
        bot.send_message(msg.chat.id, TRANSIENT_ERROR_TEXT).await?;
    }

    Ok(())
}

async fn dispatch(bot: &Bot, msg: &Message, cmd: Command, db: &DatabaseManager) -> anyhow::Result<()> {
    match cmd {
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
        Command::Start { payload } => {
            commands::start::handle_start(bot, msg, &payload, db).await?;
        }
        Command::Quiz => {
            games::quiz::start(bot, db, &GameContext::from_message(msg)).await?;
        }
        Command::Movie => {
            games::movie::start(bot, db, &GameContext::from_message(msg)).await?;
        }
        Command::Emoji => {
            games::emoji_pattern::start(bot, db, &GameContext::from_message(msg)).await?;
        }
        Command::Charades => {
            if !is_group_chat(msg) {
                bot.send_message(msg.chat.id, "🎭 Charades only works in group chats!")
                    .await?;
                return Ok(());
            }
            games::charades::start(bot, db, &GameContext::from_message(msg)).await?;
        }
        Command::Bingo { minutes } => {
            handle_bingo_command(bot, msg, &minutes, db).await?;
        }
        Command::Join => {
            games::bingo::join(bot, db, msg).await?;
        }
        Command::Claim => {
            games::bingo::claim(bot, db, msg).await?;
        }
        Command::Leaderboard => {
            commands::leaderboard::handle_leaderboard(bot, msg, db).await?;
        }
        Command::Inviters => {
            commands::invite::handle_inviters(bot, msg, db).await?;
        }
        Command::Invite => {
            commands::invite::handle_invite(bot, msg, db).await?;
        }
        Command::Status => {
            commands::status::handle_status(bot, msg, db).await?;
        }
        Command::Active => {
            commands::active::handle_active(bot, msg, db).await?;
        }
        Command::Config { args } => {
            commands::config::handle_config(bot, msg, &args, db).await?;
        }
        Command::End { game } => {
            commands::end::handle_end(bot, msg, &game, db).await?;
        }
    }
    Ok(())
}

async fn handle_bingo_command(
    bot: &Bot,
    msg: &Message,
    minutes_arg: &str,
    db: &DatabaseManager,
) -> anyhow::Result<()> {
    if !is_group_chat(msg) {
        bot.send_message(msg.chat.id, "🎱 Bingo only works in group chats!")
            .await?;
        return Ok(());
    }
    let Some(user) = msg.from() else {
        return Ok(());
    };
    if !can_manage_games(bot, &db.pool, msg.chat.id, user).await? {
        bot.send_message(msg.chat.id, "🔒 Only admins can start a bingo game.")
            .await?;
        return Ok(());
    }

    let minutes = match validate_bingo_minutes(minutes_arg) {
        Ok(minutes) => minutes,
        Err(e) => {
            log_validation_error(
                "bingo",
                "minutes",
                minutes_arg,
                &e.to_string(),
                user.username.as_deref().unwrap_or("unknown"),
                user.id.0 as i64,
                msg.chat.id.0,
            );
            bot.send_message(msg.chat.id, format!("⚠️ {e}")).await?;
            return Ok(());
        }
    };

    games::bingo::start_registration(bot, db, &GameContext::from_message(msg), minutes).await
}

fn is_group_chat(msg: &Message) -> bool {
    msg.chat.is_group() || msg.chat.is_supergroup()
}

fn name_of(cmd: &Command) -> &'static str {
    match cmd {
        Command::Help => "help",
        Command::Start { .. } => "start",
        Command::Quiz => "quiz",
        Command::Movie => "movie",
        Command::Emoji => "emoji",
        Command::Charades => "charades",
        Command::Bingo { .. } => "bingo",
        Command::Join => "join",
        Command::Claim => "claim",
        Command::Leaderboard => "leaderboard",
        Command::Inviters => "inviters",
        Command::Invite => "invite",
        Command::Status => "status",
        Command::Active => "active",
        Command::Config { .. } => "config",
        Command::End { .. } => "end",
    }
}
