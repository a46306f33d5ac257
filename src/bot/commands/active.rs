use anyhow::Result;
use teloxide::prelude::*;

use crate::database::connection::DatabaseManager;
use crate::database::models::UserActivity;

const TOP_N: i64 = 10;

pub async fn handle_active(bot: &Bot, msg: &Message, db: &DatabaseManager) -> Result<()> {
    let standings = UserActivity::top(&db.pool, msg.chat.id.0, TOP_N).await?;

    if standings.is_empty() {
        bot.send_message(
            msg.chat.id,
            "🔥 Nobody has said anything here yet. Break the silence!",
        )
        .await?;
        return Ok(());
    }

    let mut text = String::from("🔥 MOST ACTIVE MEMBERS 🔥\n\n");
    for (i, standing) in standings.iter().enumerate() {
        let name = standing
            .username
            .clone()
            .or_else(|| standing.first_name.clone())
            .unwrap_or_else(|| standing.user_id.to_string());
        text.push_str(&format!(
            "{}. {} — {} message(s)\n",
            i + 1,
            name,
            standing.message_count,
        ));
    }

    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}
