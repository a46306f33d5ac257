use teloxide::prelude::*;

use crate::database::connection::DatabaseManager;
use crate::games;
use crate::utils::logging::log_command_error;

/// Inline-keyboard answers arrive as `<game>:<option index>`.
pub async fn callback_handler(bot: Bot, q: CallbackQuery, db: DatabaseManager) -> ResponseResult<()> {
    let user_id = q.from.id.0 as i64;
    let username = q.from.username.clone().unwrap_or_else(|| "unknown".to_string());
    let chat_id = q.message.as_ref().map(|m| m.chat.id.0).unwrap_or(0);

    let Some(data) = q.data.clone() else {
        bot.answer_callback_query(&q.id).await?;
        return Ok(());
    };

    tracing::info!(
        "Callback received: '{}' from user {}({}) in chat {}",
        data,
        username,
        user_id,
        chat_id
    );

    let parsed = data
        .split_once(':')
        .and_then(|(game, index)| index.parse::<usize>().ok().map(|i| (game.to_string(), i)));
    let Some((game, index)) = parsed else {
        bot.answer_callback_query(&q.id)
            .text("I can't read that button anymore.")
            .await?;
        return Ok(());
    };

    let result = match game.as_str() {
        "quiz" => games::quiz::handle_answer(&bot, &db, &q, index).await,
        "movie" => games::movie::handle_answer(&bot, &db, &q, index).await,
        "charades" => games::charades::handle_answer(&bot, &db, &q, index).await,
        _ => {
            bot.answer_callback_query(&q.id)
                .text("This button belongs to a game I no longer run.")
                .await?;
            return Ok(());
        }
    };

    if let Err(e) = result {
        log_command_error(&game, &username, user_id, chat_id, &format!("{e:#}"));
        bot.answer_callback_query(&q.id)
            .text("Something went wrong. Please try again.")
            .await?;
    }

    Ok(())
}
