use anyhow::Result;
use chrono::{Duration, Utc};
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::warn;

use crate::database::connection::DatabaseManager;
use crate::database::models::{GameSession, Setting, SessionToken, User};
use crate::games::data::{self, QuizQuestion};
use crate::games::scoring::speed_weighted_points;
use crate::games::{GameContext, GamePlayer, GameState, GameType, QuizState};

pub const TIME_LIMIT_SECS: i64 = 30;
const FLOOR_POINTS: i64 = 1;

/// Outcome of grading a quiz answer. `Stale` covers every race where the
/// round ended or was replaced between button press and processing.
#[derive(Debug)]
pub enum QuizOutcome {
    Stale,
    InvalidOption,
    Correct {
        state: QuizState,
        points: i64,
        elapsed: f64,
    },
    Incorrect {
        state: QuizState,
        chosen_index: usize,
    },
}

pub async fn start(bot: &Bot, db: &DatabaseManager, ctx: &GameContext) -> Result<()> {
    let chat_id = ctx.chat_id;

    if let Some(player) = &ctx.user {
        register_player(db, player).await?;
    }

    if GameSession::get_active(&db.pool, chat_id.0, GameType::Quiz)
        .await?
        .is_some()
    {
        bot.send_message(chat_id, "⚠️ There is already a quiz running in this chat!")
            .await?;
        return Ok(());
    }

    let used = GameSession::get_used_questions(&db.pool, chat_id.0, GameType::Quiz).await?;
    let Some(question) = data::random_question(&used) else {
        bot.send_message(
            chat_id,
            "😮 This chat has been through every question I have. Impressive!",
        )
        .await?;
        return Ok(());
    };

    let state = QuizState {
        question_id: question.id,
        question: question.question.to_string(),
        options: question.options.iter().map(|o| o.to_string()).collect(),
        correct_index: question.correct_index,
        category: question.category.to_string(),
        started_at: Utc::now(),
        started_by: ctx.user.as_ref().map(|u| u.id),
    };

    let token = GameSession::start(
        &db.pool,
        chat_id.0,
        &GameState::Quiz(state),
        Duration::seconds(TIME_LIMIT_SECS),
    )
    .await?;
    GameSession::mark_question_used(
        &db.pool,
        chat_id.0,
        GameType::Quiz,
        &question.id.to_string(),
    )
    .await?;

    let message = bot
        .send_message(chat_id, format_question(question))
        .reply_markup(options_keyboard(&question.options))
        .await?;

    spawn_timeout(bot.clone(), db.clone(), chat_id, message.id, token);
    Ok(())
}

/// Grade a pressed option against the active round. Mutates points and
/// ends the round; stale or replaced rounds are left untouched.
pub async fn grade_answer(
    pool: &sqlx::SqlitePool,
    chat_id: i64,
    user_id: i64,
    chosen_index: usize,
) -> Result<QuizOutcome, sqlx::Error> {
    let Some(game) = GameSession::get_active(pool, chat_id, GameType::Quiz).await? else {
        return Ok(QuizOutcome::Stale);
    };
    let GameState::Quiz(state) = game.state else {
        return Ok(QuizOutcome::Stale);
    };
    if chosen_index >= state.options.len() {
        return Ok(QuizOutcome::InvalidOption);
    }

    let elapsed = (Utc::now() - state.started_at).num_milliseconds() as f64 / 1000.0;
    GameSession::end(pool, chat_id, GameType::Quiz).await?;

    if chosen_index == state.correct_index {
        let base = Setting::get_i64(pool, "points_per_correct_answer", 10).await?;
        let points = speed_weighted_points(base, elapsed, TIME_LIMIT_SECS as f64, FLOOR_POINTS);
        User::add_points(pool, user_id, points, GameType::Quiz.as_str(), Some(elapsed)).await?;
        Ok(QuizOutcome::Correct {
            state,
            points,
            elapsed,
        })
    } else {
        Ok(QuizOutcome::Incorrect {
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
        QuizOutcome::Stale => {
            bot.answer_callback_query(&query.id)
                .text("This quiz is already over.")
                .await?;
        }
        QuizOutcome::InvalidOption => {
            bot.answer_callback_query(&query.id)
                .text("That option does not exist.")
                .await?;
        }
        QuizOutcome::Correct {
            state,
            points,
            elapsed,
        } => {
            bot.answer_callback_query(&query.id).await?;
            let text = format!(
                "✅ Correct, {}!\n\nCategory: {}\nQuestion: {}\n\nAnswer: {}\nResponse time: {elapsed:.1}s\nYou earned {points} points! 🎉",
                player.first_name, state.category, state.question, state.options[state.correct_index],
            );
            bot.edit_message_text(chat_id, message.id, text).await?;
        }
        QuizOutcome::Incorrect {
            state,
            chosen_index,
        } => {
            bot.answer_callback_query(&query.id).await?;
            let text = format!(
                "❌ Incorrect, {}\n\nCategory: {}\nQuestion: {}\n\nYour answer: {}\nCorrect answer: {}\nBetter luck next time! 📚",
                player.first_name,
                state.category,
                state.question,
                state.options[chosen_index],
                state.options[state.correct_index],
            );
            bot.edit_message_text(chat_id, message.id, text).await?;
        }
    }

    Ok(())
}

fn format_question(question: &QuizQuestion) -> String {
    format!(
        "🧠 QUIZ 🧠\n\nCategory: {}\n\n{}\n\n⏱️ You have {TIME_LIMIT_SECS} seconds to answer.",
        question.category, question.question,
    )
}

fn options_keyboard(options: &[&str]) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            vec![InlineKeyboardButton::callback(
                option.to_string(),
                format!("quiz:{i}"),
            )]
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}

/// Reveal the answer when the limit passes. Reloads the session and only
/// acts when the same round is still active; an answered or replaced
/// round makes this a no-op.
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
            let Some(game) = GameSession::get_active(&db.pool, chat_id.0, GameType::Quiz).await?
            else {
                return Ok::<_, anyhow::Error>(());
            };
            if game.token != token {
                return Ok(());
            }
            let GameState::Quiz(state) = game.state else {
                return Ok(());
            };

            GameSession::end(&db.pool, chat_id.0, GameType::Quiz).await?;

            let text = format!(
                "⏱️ TIME'S UP! ⏱️\n\nCategory: {}\nQuestion: {}\n\nCorrect answer: {}",
                state.category, state.question, state.options[state.correct_index],
            );
            bot.edit_message_text(chat_id, message_id, text).await?;
            Ok(())
        }
        .await;

        if let Err(e) = result {
            warn!("Quiz timeout handling failed for chat {}: {}", chat_id, e);
        }
    });
}

pub(crate) async fn register_player(db: &DatabaseManager, player: &GamePlayer) -> Result<(), sqlx::Error> {
    User::register(
        &db.pool,
        player.id,
        player.username.clone(),
        Some(player.first_name.clone()),
        player.last_name.clone(),
        None,
    )
    .await
}
