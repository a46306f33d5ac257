use anyhow::Result;
use chrono::Utc;
use teloxide::prelude::*;

use crate::database::connection::DatabaseManager;
use crate::database::models::GameSession;
use crate::games::{BingoPhase, GameState};

pub async fn handle_status(bot: &Bot, msg: &Message, db: &DatabaseManager) -> Result<()> {
    let active = GameSession::active_in_chat(&db.pool, msg.chat.id.0).await?;

    if active.is_empty() {
        bot.send_message(
            msg.chat.id,
            "No games running here right now. Start one: /quiz, /movie, /emoji, /charades or /bingo!",
        )
        .await?;
        return Ok(());
    }

    let now = Utc::now();
    let mut text = String::from("🎮 ACTIVE GAMES 🎮\n\n");
    for game in &active {
        let game_type = game.state.game_type();
        let remaining = (game.deadline - now).num_seconds().max(0);
        match &game.state {
            GameState::Bingo(state) => {
                let phase = match state.phase {
                    BingoPhase::Registration => format!(
                        "registration open, {} player(s), closes in {}s",
                        state.participants.len(),
                        (state.registration_deadline - now).num_seconds().max(0),
                    ),
                    BingoPhase::Playing => format!(
                        "playing, {} player(s), {}/75 numbers drawn, {} winner(s)",
                        state.participants.len(),
                        state.drawn_numbers.len(),
                        state.winners.len(),
                    ),
                    BingoPhase::Ended => "finished".to_string(),
                };
                text.push_str(&format!("• {} — {phase}\n", game_type.display_name()));
            }
            _ => {
                text.push_str(&format!(
                    "• {} — {remaining}s remaining\n",
                    game_type.display_name(),
                ));
            }
        }
    }

    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}
