use anyhow::Result;
use chrono::{Duration, Utc};
use teloxide::prelude::*;
use tracing::warn;

use crate::database::connection::DatabaseManager;
use crate::database::models::{GameSession, Setting, SessionToken, User};
use crate::games::data;
use crate::games::quiz::register_player;
use crate::games::scoring::speed_weighted_points;
use crate::games::{EmojiPatternState, GameContext, GamePlayer, GameState, GameType};

pub const TIME_LIMIT_SECS: i64 = 60;
const FLOOR_POINTS: i64 = 1;

#[derive(Debug)]
pub enum GuessOutcome {
    /// No active round, or the text is not the answer. The round keeps
    /// running; group chatter must not kill it.
    NotAGuess,
    Correct {
        state: EmojiPatternState,
        points: i64,
        elapsed: f64,
    },
}

pub async fn start(bot: &Bot, db: &DatabaseManager, ctx: &GameContext) -> Result<()> {
    let chat_id = ctx.chat_id;

    if let Some(player) = &ctx.user {
        register_player(db, player).await?;
    }

    if GameSession::get_active(&db.pool, chat_id.0, GameType::EmojiPattern)
        .await?
        .is_some()
    {
        bot.send_message(
            chat_id,
            "⚠️ There is already an emoji pattern running in this chat!",
        )
        .await?;
        return Ok(());
    }

    let used = GameSession::get_used_questions(&db.pool, chat_id.0, GameType::EmojiPattern).await?;
    let Some(pattern) = data::random_pattern(&used) else {
        bot.send_message(
            chat_id,
            "😮 This chat has solved every pattern I have. Well played!",
        )
        .await?;
        return Ok(());
    };

    let state = EmojiPatternState {
        pattern_id: pattern.id,
        pattern: pattern.pattern.to_string(),
        next: pattern.next.to_string(),
        explanation: pattern.explanation.to_string(),
        difficulty: pattern.difficulty,
        solved: false,
        started_at: Utc::now(),
        started_by: ctx.user.as_ref().map(|u| u.id),
    };

    let token = GameSession::start(
        &db.pool,
        chat_id.0,
        &GameState::EmojiPattern(state),
        Duration::seconds(TIME_LIMIT_SECS),
    )
    .await?;
    GameSession::mark_question_used(
        &db.pool,
        chat_id.0,
        GameType::EmojiPattern,
        &pattern.id.to_string(),
    )
    .await?;

    let text = format!(
        "🧩 EMOJI PATTERN 🧩\n\n{}  ❓\n\nWhich emoji comes next? Reply with it!\nDifficulty: {}\n⏱️ You have {TIME_LIMIT_SECS} seconds.",
        pattern.pattern,
        "⭐".repeat(pattern.difficulty as usize),
    );
    bot.send_message(chat_id, text).await?;

    spawn_timeout(bot.clone(), db.clone(), chat_id, token);
    Ok(())
}

/// Check a chat message against the active pattern. Only a correct
/// answer mutates anything; everything else is `NotAGuess` so the
/// message handler can let normal conversation through.
pub async fn check_guess(
    pool: &sqlx::SqlitePool,
    chat_id: i64,
    user_id: i64,
    text: &str,
) -> Result<GuessOutcome, sqlx::Error> {
    let Some(game) = GameSession::get_active(pool, chat_id, GameType::EmojiPattern).await? else {
        return Ok(GuessOutcome::NotAGuess);
    };
    let GameState::EmojiPattern(mut state) = game.state else {
        return Ok(GuessOutcome::NotAGuess);
    };
    if state.solved || normalize(text) != normalize(&state.next) {
        return Ok(GuessOutcome::NotAGuess);
    }

    let elapsed = (Utc::now() - state.started_at).num_milliseconds() as f64 / 1000.0;
    state.solved = true;
    GameSession::update(
        pool,
        chat_id,
        &GameState::EmojiPattern(state.clone()),
        Duration::seconds(TIME_LIMIT_SECS),
        &game.token,
    )
    .await?;
    GameSession::end(pool, chat_id, GameType::EmojiPattern).await?;

    let base = Setting::get_i64(pool, "points_per_correct_answer", 10).await?;
    let speed_points =
        speed_weighted_points(base, elapsed, TIME_LIMIT_SECS as f64, FLOOR_POINTS);
    // Trickier patterns are worth more.
    let multiplier = 1.0 + 0.5 * state.difficulty as f64;
    let points = ((speed_points as f64 * multiplier) as i64).max(FLOOR_POINTS);
    User::add_points(
        pool,
        user_id,
        points,
        GameType::EmojiPattern.as_str(),
        Some(elapsed),
    )
    .await?;

    Ok(GuessOutcome::Correct {
        state,
        points,
        elapsed,
    })
}

/// Plain-message hook used by the dispatcher. Returns true when the
/// message was consumed as a winning guess.
pub async fn handle_message(bot: &Bot, db: &DatabaseManager, msg: &Message) -> Result<bool> {
    let Some(text) = msg.text() else {
        return Ok(false);
    };
    let Some(user) = msg.from() else {
        return Ok(false);
    };
    let player = GamePlayer::from(user);

    match check_guess(&db.pool, msg.chat.id.0, player.id, text).await? {
        GuessOutcome::NotAGuess => Ok(false),
        GuessOutcome::Correct {
            state,
            points,
            elapsed,
        } => {
            register_player(db, &player).await?;
            let text = format!(
                "✅ {} got it!\n\n{}  {}\n\n{}\nResponse time: {elapsed:.1}s\nYou earned {points} points! 🎉",
                player.first_name, state.pattern, state.next, state.explanation,
            );
            bot.send_message(msg.chat.id, text).await?;
            Ok(true)
        }
    }
}

fn normalize(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|c| *c != '\u{fe0f}' && *c != '\u{200d}')
        .collect()
}

fn spawn_timeout(bot: Bot, db: DatabaseManager, chat_id: ChatId, token: SessionToken) {
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_secs(TIME_LIMIT_SECS as u64)).await;

        let result = async {
            let Some(game) =
                GameSession::get_active(&db.pool, chat_id.0, GameType::EmojiPattern).await?
            else {
                return Ok::<_, anyhow::Error>(());
            };
            if game.token != token {
                return Ok(());
            }
            let GameState::EmojiPattern(state) = game.state else {
                return Ok(());
            };

            GameSession::end(&db.pool, chat_id.0, GameType::EmojiPattern).await?;

            if !state.solved {
                let text = format!(
                    "⏱️ TIME'S UP! ⏱️\n\n{}  {}\n\n{}",
                    state.pattern, state.next, state.explanation,
                );
                bot.send_message(chat_id, text).await?;
            }
            Ok(())
        }
        .await;

        if let Err(e) = result {
            warn!(
                "Emoji pattern timeout handling failed for chat {}: {}",
                chat_id, e
            );
        }
    });
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn normalize_strips_variation_selectors() {
        assert_eq!(normalize(" ☀️ "), normalize("☀"));
    }

    #[test]
    fn normalize_distinguishes_different_emoji() {
        assert_ne!(normalize("🌖"), normalize("🌗"));
    }
}
