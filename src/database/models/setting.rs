use chrono::Utc;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Setting {
    pub setting_key: String,
    pub setting_value: String,
    pub updated_at: String,
}

impl Setting {
    pub async fn get(
        pool: &sqlx::SqlitePool,
        key: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT setting_value FROM settings WHERE setting_key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Upsert; last write wins, which is all the admin surface needs.
    pub async fn set(
        pool: &sqlx::SqlitePool,
        key: &str,
        value: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO settings (setting_key, setting_value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(setting_key) DO UPDATE SET
                setting_value = excluded.setting_value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Typed interpretation is the caller's responsibility; unparseable or
    /// missing values fall back to the default.
    pub async fn get_i64(
        pool: &sqlx::SqlitePool,
        key: &str,
        default: i64,
    ) -> Result<i64, sqlx::Error> {
        Ok(Self::get(pool, key)
            .await?
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default))
    }

    pub async fn get_bool(
        pool: &sqlx::SqlitePool,
        key: &str,
        default: bool,
    ) -> Result<bool, sqlx::Error> {
        Ok(Self::get(pool, key)
            .await?
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(default))
    }

    /// JSON integer-array settings such as `admin_ids` and `game_chat_ids`.
    pub async fn get_id_list(
        pool: &sqlx::SqlitePool,
        key: &str,
    ) -> Result<Vec<i64>, sqlx::Error> {
        Ok(Self::get(pool, key)
            .await?
            .and_then(|v| serde_json::from_str(&v).ok())
            .unwrap_or_default())
    }
}

/// Snapshot of the runtime-tunable settings, loaded from the database on
/// demand rather than cached in mutable globals.
#[derive(Debug, Clone)]
pub struct GameSettings {
    pub base_points: i64,
    pub invitation_points: i64,
    pub invitation_enabled: bool,
    pub max_game_duration_secs: i64,
    pub game_frequency_minutes: i64,
    pub admin_ids: Vec<i64>,
    pub game_chat_ids: Vec<i64>,
}

impl GameSettings {
    pub async fn load(pool: &sqlx::SqlitePool) -> Result<Self, sqlx::Error> {
        Ok(Self {
            base_points: Setting::get_i64(pool, "points_per_correct_answer", 10).await?,
            invitation_points: Setting::get_i64(pool, "invitation_points", 5).await?,
            invitation_enabled: Setting::get_bool(pool, "invitation_enabled", true).await?,
            max_game_duration_secs: Setting::get_i64(pool, "max_game_duration_seconds", 300)
                .await?,
            game_frequency_minutes: Setting::get_i64(pool, "game_frequency_minutes", 30).await?,
            admin_ids: Setting::get_id_list(pool, "admin_ids").await?,
            game_chat_ids: Setting::get_id_list(pool, "game_chat_ids").await?,
        })
    }

    pub fn is_bot_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }
}
