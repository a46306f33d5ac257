use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub points: i64,
    pub invited_by: Option<i64>,
    pub join_date: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PointsHistoryEntry {
    pub id: i64,
    pub user_id: i64,
    pub points: i64,
    pub game_type: String,
    pub response_time: Option<f64>,
    pub timestamp: String,
}

impl User {
    /// Insert a new user or refresh the name fields of an existing one.
    /// Points and `invited_by` are never touched on re-registration.
    pub async fn register(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        username: Option<String>,
        first_name: Option<String>,
        last_name: Option<String>,
        invited_by: Option<i64>,
    ) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, first_name, last_name, points, invited_by, join_date)
            VALUES (?, ?, ?, ?, 0, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                username = excluded.username,
                first_name = excluded.first_name,
                last_name = excluded.last_name
            "#,
        )
        .bind(user_id)
        .bind(username)
        .bind(first_name)
        .bind(last_name)
        .bind(invited_by)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn find(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT user_id, username, first_name, last_name, points, invited_by, join_date
             FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Apply a signed point delta and append the matching history entry in
    /// one transaction.
    pub async fn add_points(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        delta: i64,
        game_type: &str,
        response_time: Option<f64>,
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE users SET points = points + ? WHERE user_id = ?")
            .bind(delta)
            .bind(user_id)
            .execute(&mut tx)
            .await?;

        sqlx::query(
            "INSERT INTO points_history (user_id, points, game_type, response_time, timestamp)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(delta)
        .bind(game_type)
        .bind(response_time)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut tx)
        .await?;

        tx.commit().await
    }

    pub async fn points(pool: &sqlx::SqlitePool, user_id: i64) -> Result<i64, sqlx::Error> {
        let points: Option<i64> = sqlx::query_scalar("SELECT points FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        Ok(points.unwrap_or(0))
    }

    pub async fn leaderboard(
        pool: &sqlx::SqlitePool,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT user_id, username, first_name, last_name, points, invited_by, join_date
             FROM users ORDER BY points DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn history(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Vec<PointsHistoryEntry>, sqlx::Error> {
        sqlx::query_as::<_, PointsHistoryEntry>(
            "SELECT id, user_id, points, game_type, response_time, timestamp
             FROM points_history WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Display name for chat messages: username when set, first name
    /// otherwise.
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .or_else(|| self.first_name.clone())
            .unwrap_or_else(|| self.user_id.to_string())
    }
}
