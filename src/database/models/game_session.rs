use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::games::{GameState, GameType};

/// Identity of one logical game round. A fresh token is minted when a new
/// round starts; in-place state overwrites keep the token. Timers compare
/// their captured token against the stored one before acting, so a timer
/// belonging to a replaced or ended round is a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The decoded active session for a (chat, game type) pair.
#[derive(Debug, Clone)]
pub struct ActiveGame {
    pub token: SessionToken,
    pub state: GameState,
    pub started_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct GameSessionRow {
    token: String,
    data: String,
    start_time: String,
    end_time: String,
}

/// Session manager over the `active_games` table: at most one active row
/// per (chat_id, game_type), enforced structurally by a UNIQUE pair. The
/// row is reused across rounds; `used_questions` survives overwrites.
pub struct GameSession;

impl GameSession {
    /// Start a new round, replacing whatever was active for this pair.
    /// Last write wins; there is no merge and no error on overwrite.
    pub async fn start(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        state: &GameState,
        ttl: Duration,
    ) -> Result<SessionToken, sqlx::Error> {
        let token = SessionToken::new();
        Self::write(pool, chat_id, state, ttl, &token).await?;
        Ok(token)
    }

    /// Overwrite the state of an ongoing round without changing its
    /// identity, resetting the expiry. Used for per-event updates such as
    /// bingo draws and joins.
    pub async fn update(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        state: &GameState,
        ttl: Duration,
        token: &SessionToken,
    ) -> Result<(), sqlx::Error> {
        Self::write(pool, chat_id, state, ttl, token).await
    }

    async fn write(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        state: &GameState,
        ttl: Duration,
        token: &SessionToken,
    ) -> Result<(), sqlx::Error> {
        let data = serde_json::to_string(state).map_err(into_decode_error)?;
        let now = Utc::now();
        let end_time = now + ttl;

        sqlx::query(
            r#"
            INSERT INTO active_games (chat_id, game_type, token, data, start_time, end_time, is_active)
            VALUES (?, ?, ?, ?, ?, ?, TRUE)
            ON CONFLICT(chat_id, game_type) DO UPDATE SET
                token = excluded.token,
                data = excluded.data,
                start_time = excluded.start_time,
                end_time = excluded.end_time,
                is_active = TRUE
            "#,
        )
        .bind(chat_id)
        .bind(state.game_type().as_str())
        .bind(token.as_str())
        .bind(&data)
        .bind(now.to_rfc3339())
        .bind(end_time.to_rfc3339())
        .execute(pool)
        .await?;

        Ok(())
    }

    /// The current round for this pair, or `None` when nothing is active.
    pub async fn get_active(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        game_type: GameType,
    ) -> Result<Option<ActiveGame>, sqlx::Error> {
        let row = sqlx::query_as::<_, GameSessionRow>(
            "SELECT token, data, start_time, end_time FROM active_games
             WHERE chat_id = ? AND game_type = ? AND is_active = TRUE",
        )
        .bind(chat_id)
        .bind(game_type.as_str())
        .fetch_optional(pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let state: GameState = serde_json::from_str(&row.data).map_err(into_decode_error)?;
        let started_at = parse_timestamp(&row.start_time)?;
        let deadline = parse_timestamp(&row.end_time)?;

        Ok(Some(ActiveGame {
            token: SessionToken(row.token),
            state,
            started_at,
            deadline,
        }))
    }

    /// Mark the round as over. A no-op when nothing is active, so both the
    /// natural-resolution path and the timeout path can call it safely.
    pub async fn end(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        game_type: GameType,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE active_games SET is_active = FALSE, end_time = ?
             WHERE chat_id = ? AND game_type = ? AND is_active = TRUE",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(chat_id)
        .bind(game_type.as_str())
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Append a question id to the row-level dedup set. Independent of the
    /// payload, so it persists across round overwrites.
    pub async fn mark_question_used(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        game_type: GameType,
        question_id: &str,
    ) -> Result<(), sqlx::Error> {
        let mut used = Self::get_used_questions(pool, chat_id, game_type).await?;
        if used.iter().any(|id| id == question_id) {
            return Ok(());
        }
        used.push(question_id.to_string());
        let encoded = serde_json::to_string(&used).map_err(into_decode_error)?;

        sqlx::query(
            "UPDATE active_games SET used_questions = ?
             WHERE chat_id = ? AND game_type = ?",
        )
        .bind(encoded)
        .bind(chat_id)
        .bind(game_type.as_str())
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn get_used_questions(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        game_type: GameType,
    ) -> Result<Vec<String>, sqlx::Error> {
        let encoded: Option<String> = sqlx::query_scalar(
            "SELECT used_questions FROM active_games
             WHERE chat_id = ? AND game_type = ?",
        )
        .bind(chat_id)
        .bind(game_type.as_str())
        .fetch_optional(pool)
        .await?;

        match encoded {
            Some(encoded) => serde_json::from_str(&encoded).map_err(into_decode_error),
            None => Ok(Vec::new()),
        }
    }

    /// How many sessions (any type) are currently active in a chat.
    pub async fn active_in_chat(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
    ) -> Result<Vec<ActiveGame>, sqlx::Error> {
        let mut games = Vec::new();
        for game_type in GameType::ALL {
            if let Some(game) = Self::get_active(pool, chat_id, game_type).await? {
                games.push(game);
            }
        }
        Ok(games)
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(into_decode_error)
}

fn into_decode_error<E>(err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(err))
}
