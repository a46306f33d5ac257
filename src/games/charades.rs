use anyhow::Result;
use chrono::{Duration, Utc};
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::{info, warn};

use crate::database::connection::DatabaseManager;
use crate::database::models::{GameSession, Setting, SessionToken, User};
use crate::games::data;
use crate::games::quiz::register_player;
use crate::games::scoring::speed_weighted_points;
use crate::games::{CharadesState, GameContext, GamePlayer, GameState, GameType};

const OPTION_COUNT: usize = 4;
const FLOOR_POINTS: i64 = 1;
const DEFAULT_DURATION_SECS: i64 = 300;

#[derive(Debug)]
pub enum CharadesOutcome {
    Stale,
    InvalidOption,
    OwnCharade,
    Correct {
        state: CharadesState,
        points: i64,
        elapsed: f64,
    },
    Incorrect {
        chosen: String,
    },
}

pub async fn start(bot: &Bot, db: &DatabaseManager, ctx: &GameContext) -> Result<()> {
    let chat_id = ctx.chat_id;
    let Some(starter) = &ctx.user else {
        // Charades needs a human actor, so scheduled starts never pick it.
        return Ok(());
    };
    register_player(db, starter).await?;

    if GameSession::get_active(&db.pool, chat_id.0, GameType::Charades)
        .await?
        .is_some()
    {
        bot.send_message(
            chat_id,
            "⚠️ There is already a charades round running in this chat!",
        )
        .await?;
        return Ok(());
    }

    let charade = data::random_charade();
    let options = data::charade_options(charade.theme, charade.category, OPTION_COUNT);
    let correct_index = options
        .iter()
        .position(|o| o == charade.theme)
        .unwrap_or_default();
    let duration =
        Setting::get_i64(&db.pool, "max_game_duration_seconds", DEFAULT_DURATION_SECS).await?;

    let state = CharadesState {
        theme: charade.theme.to_string(),
        category: charade.category.to_string(),
        options: options.clone(),
        correct_index,
        guessed: false,
        started_at: Utc::now(),
        started_by: starter.id,
    };

    let token = GameSession::start(
        &db.pool,
        chat_id.0,
        &GameState::Charades(state),
        Duration::seconds(duration),
    )
    .await?;

    // The theme goes to the actor in private. Without that DM there is
    // no round, so a failed send cancels the session.
    let secret = format!(
        "🎭 Your charades theme:\n\n{}\nCategory: {}\n\nAct it out in the group without words!",
        charade.theme, charade.category,
    );
    if bot
        .send_message(ChatId(starter.id), secret)
        .await
        .is_err()
    {
        GameSession::end(&db.pool, chat_id.0, GameType::Charades).await?;
        info!(
            "Cancelled charades in chat {}: could not DM starter {}",
            chat_id, starter.id
        );
        bot.send_message(
            chat_id,
            format!(
                "😕 {}, I couldn't send you the secret theme. Open a private chat with me first, then try /charades again.",
                starter.first_name
            ),
        )
        .await?;
        return Ok(());
    }

    let text = format!(
        "🎭 CHARADES 🎭\n\n{} is acting out something from the category: {}\n\nWatch closely and guess with the buttons below!\n⏱️ You have {} minutes.",
        starter.first_name,
        charade.category,
        duration / 60,
    );
    bot.send_message(chat_id, text)
        .reply_markup(options_keyboard(&options))
        .await?;

    spawn_timeout(bot.clone(), db.clone(), chat_id, token, duration);
    Ok(())
}

pub async fn grade_answer(
    pool: &sqlx::SqlitePool,
    chat_id: i64,
    user_id: i64,
    chosen_index: usize,
) -> Result<CharadesOutcome, sqlx::Error> {
    let Some(game) = GameSession::get_active(pool, chat_id, GameType::Charades).await? else {
        return Ok(CharadesOutcome::Stale);
    };
    let GameState::Charades(state) = game.state else {
        return Ok(CharadesOutcome::Stale);
    };
    if state.guessed {
        return Ok(CharadesOutcome::Stale);
    }
    if user_id == state.started_by {
        return Ok(CharadesOutcome::OwnCharade);
    }
    if chosen_index >= state.options.len() {
        return Ok(CharadesOutcome::InvalidOption);
    }
    if chosen_index != state.correct_index {
        // Wrong guesses leave the round running.
        return Ok(CharadesOutcome::Incorrect {
            chosen: state.options[chosen_index].clone(),
        });
    }

    let elapsed = (Utc::now() - state.started_at).num_milliseconds() as f64 / 1000.0;
    let limit = (game.deadline - state.started_at).num_seconds().max(1) as f64;

    let mut state = state;
    state.guessed = true;
    GameSession::update(
        pool,
        chat_id,
        &GameState::Charades(state.clone()),
        chrono::Duration::seconds(limit as i64),
        &game.token,
    )
    .await?;
    GameSession::end(pool, chat_id, GameType::Charades).await?;

    let base = Setting::get_i64(pool, "points_per_correct_answer", 10).await?;
    let points = speed_weighted_points(base, elapsed, limit, FLOOR_POINTS);
    User::add_points(pool, user_id, points, GameType::Charades.as_str(), Some(elapsed)).await?;

    Ok(CharadesOutcome::Correct {
        state,
        points,
        elapsed,
    })
}

pub async fn handle_answer(
    bot: &Bot,
    db: &DatabaseManager,
    query: &CallbackQuery,
    chosen_index: usize,
) -> Result<()> {
    let Some(message) = &query.message else {
        bot.answer_callback_query(&query.id).await?;
        return Ok(());
    };
    let chat_id = message.chat.id;
    let player = GamePlayer::from(&query.from);
    register_player(db, &player).await?;

    match grade_answer(&db.pool, chat_id.0, player.id, chosen_index).await? {
        CharadesOutcome::Stale => {
            bot.answer_callback_query(&query.id)
                .text("This charades round is already over.")
                .await?;
        }
        CharadesOutcome::InvalidOption => {
            bot.answer_callback_query(&query.id)
                .text("That option does not exist.")
                .await?;
        }
        CharadesOutcome::OwnCharade => {
            bot.answer_callback_query(&query.id)
                .text("You can't guess your own charade! 🙈")
                .await?;
        }
        CharadesOutcome::Incorrect { chosen } => {
            bot.answer_callback_query(&query.id)
                .text(format!("❌ Not {chosen}, keep watching!"))
                .await?;
        }
        CharadesOutcome::Correct {
            state,
            points,
            elapsed,
        } => {
            bot.answer_callback_query(&query.id).await?;
            let text = format!(
                "✅ {} guessed it!\n\nThe theme was: {}\nCategory: {}\nResponse time: {elapsed:.1}s\nYou earned {points} points! 🎉",
                player.first_name, state.theme, state.category,
            );
            bot.edit_message_text(chat_id, message.id, text).await?;
        }
    }

    Ok(())
}

fn options_keyboard(options: &[String]) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            vec![InlineKeyboardButton::callback(
                option.clone(),
                format!("charades:{i}"),
            )]
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}

fn spawn_timeout(
    bot: Bot,
    db: DatabaseManager,
    chat_id: ChatId,
    token: SessionToken,
    duration_secs: i64,
) {
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_secs(duration_secs.max(0) as u64)).await;

        let result = async {
            let Some(game) =
                GameSession::get_active(&db.pool, chat_id.0, GameType::Charades).await?
            else {
                return Ok::<_, anyhow::Error>(());
            };
            if game.token != token {
                return Ok(());
            }
            let GameState::Charades(state) = game.state else {
                return Ok(());
            };

            GameSession::end(&db.pool, chat_id.0, GameType::Charades).await?;

            if !state.guessed {
                let text = format!(
                    "⏱️ TIME'S UP! ⏱️\n\nNobody guessed it. The theme was: {}\nCategory: {}",
                    state.theme, state.category,
                );
                bot.send_message(chat_id, text).await?;
            }
            Ok(())
        }
        .await;

        if let Err(e) = result {
            warn!(
                "Charades timeout handling failed for chat {}: {}",
                chat_id, e
            );
        }
    });
}
