use anyhow::Result;
use teloxide::prelude::*;

use crate::database::connection::DatabaseManager;
use crate::database::models::User;

const TOP_N: i64 = 10;

pub async fn handle_leaderboard(bot: &Bot, msg: &Message, db: &DatabaseManager) -> Result<()> {
    let top = User::leaderboard(&db.pool, TOP_N).await?;

    if top.is_empty() {
        bot.send_message(
            msg.chat.id,
            "🏆 The leaderboard is empty — be the first to score! Try /quiz.",
        )
        .await?;
        return Ok(());
    }

    let caller_id = msg.from().map(|u| u.id.0 as i64);
    let mut text = String::from("🏆 LEADERBOARD 🏆\n\n");
    for (i, user) in top.iter().enumerate() {
        let medal = match i {
            0 => "🥇",
            1 => "🥈",
            2 => "🥉",
            _ => "▫️",
        };
        let marker = if Some(user.user_id) == caller_id {
            " ← you"
        } else {
            ""
        };
        text.push_str(&format!(
            "{medal} {}. {} — {} points{marker}\n",
            i + 1,
            user.display_name(),
            user.points,
        ));
    }

    // Callers outside the top still get to see their own total.
    if let Some(caller_id) = caller_id {
        if !top.iter().any(|u| u.user_id == caller_id) {
            let points = User::points(&db.pool, caller_id).await?;
            text.push_str(&format!("\nYour total: {points} points"));
        }
    }

    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}
