use anyhow::Result;
use teloxide::prelude::*;

use crate::database::connection::DatabaseManager;
use crate::database::models::{Invite, Setting, User};
use crate::games::GamePlayer;

pub async fn handle_invite(bot: &Bot, msg: &Message, db: &DatabaseManager) -> Result<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let player = GamePlayer::from(user);
    User::register(
        &db.pool,
        player.id,
        player.username.clone(),
        Some(player.first_name.clone()),
        player.last_name.clone(),
        None,
    )
    .await?;

    if !Setting::get_bool(&db.pool, "invitation_enabled", true).await? {
        bot.send_message(msg.chat.id, "Invitations are currently disabled.")
            .await?;
        return Ok(());
    }

    // Reuse a pending code instead of minting a new one per call.
    let existing = Invite::find_by_user(&db.pool, player.id).await?;
    let invite = match existing.into_iter().find(|i| !i.used) {
        Some(invite) => invite,
        None => Invite::create(&db.pool, player.id).await?,
    };

    let me = bot.get_me().await?;
    let bonus = Setting::get_i64(&db.pool, "invitation_points", 5).await?;
    let link = match me.username.as_deref() {
        Some(username) => format!("https://t.me/{username}?start={}", invite.invite_code),
        None => format!("/start {}", invite.invite_code),
    };

    bot.send_message(
        msg.chat.id,
        format!(
            "📨 Your invite link:\n{link}\n\nYou earn {bonus} points when a new player joins with it!"
        ),
    )
    .await?;
    Ok(())
}

pub async fn handle_inviters(bot: &Bot, msg: &Message, db: &DatabaseManager) -> Result<()> {
    let standings = Invite::leaderboard(&db.pool, 10).await?;

    if standings.is_empty() {
        bot.send_message(
            msg.chat.id,
            "📨 Nobody has brought in a new player yet. Grab your link with /invite!",
        )
        .await?;
        return Ok(());
    }

    let mut text = String::from("📨 TOP INVITERS 📨\n\n");
    for (i, standing) in standings.iter().enumerate() {
        let name = standing
            .username
            .clone()
            .or_else(|| standing.first_name.clone())
            .unwrap_or_else(|| standing.user_id.to_string());
        text.push_str(&format!(
            "{}. {} — {} invited\n",
            i + 1,
            name,
            standing.invite_count,
        ));
    }

    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}
