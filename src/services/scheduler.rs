use rand::seq::SliceRandom;
use std::sync::Arc;
use teloxide::prelude::*;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::database::connection::DatabaseManager;
use crate::database::models::{GameSession, GameSettings};
use crate::games::{self, GameContext, GameType};
use crate::utils::logging::log_system_event;

type ServiceError = Box<dyn std::error::Error + Send + Sync>;

/// Surprise rounds for the configured game chats. Charades and bingo
/// need a human to run them, so the scheduler sticks to the three
/// self-contained games.
const SCHEDULABLE: [GameType; 3] = [GameType::Quiz, GameType::Movie, GameType::EmojiPattern];

pub struct GameScheduler {
    bot: Bot,
    db: Arc<DatabaseManager>,
    scheduler: JobScheduler,
}

impl GameScheduler {
    pub async fn new(bot: Bot, db: Arc<DatabaseManager>) -> Result<Self, ServiceError> {
        let scheduler = JobScheduler::new().await?;
        Ok(Self { bot, db, scheduler })
    }

    /// The interval is read once at startup; changing
    /// `game_frequency_minutes` takes effect on the next restart.
    pub async fn start(&mut self) -> Result<(), ServiceError> {
        let settings = GameSettings::load(&self.db.pool).await?;
        let interval_minutes = settings.game_frequency_minutes.max(1) as u64;

        let bot = self.bot.clone();
        let db = self.db.clone();
        let job = Job::new_repeated_async(
            std::time::Duration::from_secs(interval_minutes * 60),
            move |_uuid, _lock| {
                let bot = bot.clone();
                let db = db.clone();
                Box::pin(async move {
                    if let Err(e) = run_scheduled_round(bot, db).await {
                        tracing::error!("Scheduled game round failed: {}", e);
                    }
                })
            },
        )?;

        self.scheduler.add(job).await?;
        self.scheduler.start().await?;

        log_system_event(
            "Game scheduler started",
            Some(&format!("every {interval_minutes} minute(s)")),
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), ServiceError> {
        self.scheduler.shutdown().await?;
        Ok(())
    }
}

async fn run_scheduled_round(bot: Bot, db: Arc<DatabaseManager>) -> Result<(), ServiceError> {
    let settings = GameSettings::load(&db.pool).await?;
    if settings.game_chat_ids.is_empty() {
        tracing::debug!("No game chats configured, skipping scheduled round");
        return Ok(());
    }

    for &chat_id in &settings.game_chat_ids {
        // A chat already mid-game is left alone.
        if !GameSession::active_in_chat(&db.pool, chat_id).await?.is_empty() {
            tracing::debug!("Chat {} already has an active game, skipping", chat_id);
            continue;
        }

        let Some(game_type) = SCHEDULABLE.choose(&mut rand::thread_rng()).copied() else {
            continue;
        };
        let ctx = GameContext::scheduled(ChatId(chat_id));

        if let Err(e) = bot
            .send_message(ctx.chat_id, "🎲 Surprise round! Get ready...")
            .await
        {
            tracing::warn!("Could not announce scheduled game in chat {}: {}", chat_id, e);
            continue;
        }

        let result = match game_type {
            GameType::Quiz => games::quiz::start(&bot, &db, &ctx).await,
            GameType::Movie => games::movie::start(&bot, &db, &ctx).await,
            GameType::EmojiPattern => games::emoji_pattern::start(&bot, &db, &ctx).await,
            GameType::Bingo | GameType::Charades => Ok(()),
        };
        match result {
            Ok(()) => log_system_event(
                "Scheduled game started",
                Some(&format!("{game_type} in chat {chat_id}")),
            ),
            Err(e) => {
                tracing::error!("Scheduled {} failed in chat {}: {:#}", game_type, chat_id, e);
            }
        }
    }

    Ok(())
}
