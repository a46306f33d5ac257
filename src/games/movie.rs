use anyhow::Result;
use chrono::{Duration, Utc};
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::warn;

use crate::database::connection::DatabaseManager;
use crate::database::models::{GameSession, Setting, SessionToken, User};
use crate::games::data;
use crate::games::quiz::register_player;
use crate::games::scoring::speed_weighted_points;
use crate::games::{GameContext, GamePlayer, GameState, GameType, MovieState};

pub const TIME_LIMIT_SECS: i64 = 300;
const OPTION_COUNT: usize = 4;
const FLOOR_POINTS: i64 = 1;

#[derive(Debug)]
pub enum MovieOutcome {
    Stale,
    InvalidOption,
    Correct {
        state: MovieState,
        points: i64,
        elapsed: f64,
    },
    Incorrect {
        state: MovieState,
        chosen_index: usize,
    },
}

pub async fn start(bot: &Bot, db: &DatabaseManager, ctx: &GameContext) -> Result<()> {
    let chat_id = ctx.chat_id;

    if let Some(player) = &ctx.user {
        register_player(db, player).await?;
    }

    if GameSession::get_active(&db.pool, chat_id.0, GameType::Movie)
        .await?
        .is_some()
    {
        bot.send_message(
            chat_id,
            "⚠️ There is already a movie riddle running in this chat!",
        )
        .await?;
        return Ok(());
    }

    let used = GameSession::get_used_questions(&db.pool, chat_id.0, GameType::Movie).await?;
    let Some(movie) = data::random_movie(&used) else {
        bot.send_message(
            chat_id,
            "😮 This chat has guessed every movie I know. Time for a cinema trip!",
        )
        .await?;
        return Ok(());
    };

    let options = data::movie_options(movie.title, OPTION_COUNT);
    let correct_index = options
        .iter()
        .position(|o| o == movie.title)
        .unwrap_or_default();

    let state = MovieState {
        movie_id: movie.id,
        title: movie.title.to_string(),
        emoji: movie.emoji.to_string(),
        options: options.clone(),
        correct_index,
        started_at: Utc::now(),
        started_by: ctx.user.as_ref().map(|u| u.id),
    };

    let token = GameSession::start(
        &db.pool,
        chat_id.0,
        &GameState::Movie(state),
        Duration::seconds(TIME_LIMIT_SECS),
    )
    .await?;
    GameSession::mark_question_used(&db.pool, chat_id.0, GameType::Movie, &movie.id.to_string())
        .await?;

    let text = format!(
        "🎬 GUESS THE MOVIE 🎬\n\n{}\n\nWhich movie do these emojis describe?\n⏱️ You have {} minutes to answer.",
        movie.emoji,
        TIME_LIMIT_SECS / 60,
    );
    let message = bot
        .send_message(chat_id, text)
        .reply_markup(options_keyboard(&options))
        .await?;

    spawn_timeout(bot.clone(), db.clone(), chat_id, message.id, token);
    Ok(())
}

pub async fn grade_answer(
    pool: &sqlx::SqlitePool,
    chat_id: i64,
    user_id: i64,
    chosen_index: usize,
) -> Result<MovieOutcome, sqlx::Error> {
    let Some(game) = GameSession::get_active(pool, chat_id, GameType::Movie).await? else {
        return Ok(MovieOutcome::Stale);
    };
    let GameState::Movie(state) = game.state else {
        return Ok(MovieOutcome::Stale);
    };
    if chosen_index >= state.options.len() {
        return Ok(MovieOutcome::InvalidOption);
    }

    let elapsed = (Utc::now() - state.started_at).num_milliseconds() as f64 / 1000.0;
    GameSession::end(pool, chat_id, GameType::Movie).await?;

    if chosen_index == state.correct_index {
        let base = Setting::get_i64(pool, "points_per_correct_answer", 10).await?;
        let points = speed_weighted_points(base, elapsed, TIME_LIMIT_SECS as f64, FLOOR_POINTS);
        User::add_points(pool, user_id, points, GameType::Movie.as_str(), Some(elapsed)).await?;
        Ok(MovieOutcome::Correct {
            state,
            points,
            elapsed,
        })
    } else {
        Ok(MovieOutcome::Incorrect {
            state,
            chosen_index,
        })
    }
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
        MovieOutcome::Stale => {
            bot.answer_callback_query(&query.id)
                .text("This movie riddle is already over.")
                .await?;
        }
        MovieOutcome::InvalidOption => {
            bot.answer_callback_query(&query.id)
                .text("That option does not exist.")
                .await?;
        }
        MovieOutcome::Correct {
            state,
            points,
            elapsed,
        } => {
            bot.answer_callback_query(&query.id).await?;
            let text = format!(
                "✅ Correct, {}!\n\n{}\n\nThe movie was: {}\nResponse time: {elapsed:.1}s\nYou earned {points} points! 🎉",
                player.first_name, state.emoji, state.title,
            );
            bot.edit_message_text(chat_id, message.id, text).await?;
        }
        MovieOutcome::Incorrect {
            state,
            chosen_index,
        } => {
            bot.answer_callback_query(&query.id).await?;
            let text = format!(
                "❌ Not quite, {}\n\n{}\n\nYour answer: {}\nThe movie was: {}\nBetter luck next time! 🍿",
                player.first_name, state.emoji, state.options[chosen_index], state.title,
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
                format!("movie:{i}"),
            )]
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}

fn spawn_timeout(
    bot: Bot,
    db: DatabaseManager,
    chat_id: ChatId,
    message_id: teloxide::types::MessageId,
    token: SessionToken,
) {
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_secs(TIME_LIMIT_SECS as u64)).await;

        let result = async {
            let Some(game) = GameSession::get_active(&db.pool, chat_id.0, GameType::Movie).await?
            else {
                return Ok::<_, anyhow::Error>(());
            };
            if game.token != token {
                return Ok(());
            }
            let GameState::Movie(state) = game.state else {
                return Ok(());
            };

            GameSession::end(&db.pool, chat_id.0, GameType::Movie).await?;

            let text = format!(
                "⏱️ TIME'S UP! ⏱️\n\n{}\n\nThe movie was: {}",
                state.emoji, state.title,
            );
            bot.edit_message_text(chat_id, message_id, text).await?;
            Ok(())
        }
        .await;

        if let Err(e) = result {
            warn!("Movie timeout handling failed for chat {}: {}", chat_id, e);
        }
    });
}
