use chrono::Utc;
use sqlx::FromRow;

/// Ranking row for the most-active listing. Names come from `users` when
/// the member has registered; the join is left so unregistered chatters
/// still rank.
#[derive(Debug, Clone, FromRow)]
pub struct ActivityStanding {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub message_count: i64,
}

/// Per-chat interaction counters behind `/active`.
pub struct UserActivity;

impl UserActivity {
    /// Bump the counter for one interaction. Upsert, so the first message
    /// creates the row.
    pub async fn record(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        chat_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO user_activity (user_id, chat_id, message_count, last_active)
            VALUES (?, ?, 1, ?)
            ON CONFLICT(user_id, chat_id) DO UPDATE SET
                message_count = message_count + 1,
                last_active = excluded.last_active
            "#,
        )
        .bind(user_id)
        .bind(chat_id)
        .bind(Utc::now().to_rfc3339())
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn count(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        chat_id: i64,
    ) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT message_count FROM user_activity WHERE user_id = ? AND chat_id = ?",
        )
        .bind(user_id)
        .bind(chat_id)
        .fetch_optional(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }

    /// Most active members of a chat, busiest first.
    pub async fn top(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        limit: i64,
    ) -> Result<Vec<ActivityStanding>, sqlx::Error> {
        sqlx::query_as::<_, ActivityStanding>(
            r#"
            SELECT a.user_id, u.username, u.first_name, a.message_count
            FROM user_activity a
            LEFT JOIN users u ON u.user_id = a.user_id
            WHERE a.chat_id = ?
            ORDER BY a.message_count DESC, a.user_id
            LIMIT ?
            "#,
        )
        .bind(chat_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
