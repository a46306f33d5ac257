use chrono::Utc;
use rand::Rng;
use sqlx::FromRow;

use super::setting::Setting;

const CODE_LENGTH: usize = 8;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone, FromRow)]
pub struct Invite {
    pub id: i64,
    pub invite_code: String,
    pub user_id: i64,
    pub created_at: String,
    pub used: bool,
    pub used_by: Option<i64>,
    pub used_at: Option<String>,
}

/// Leaderboard row for the invite ranking: users by redeemed invites.
#[derive(Debug, Clone, FromRow)]
pub struct InviterStanding {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub invite_count: i64,
}

impl Invite {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Self, sqlx::Error> {
        let code = generate_code();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO invites (invite_code, user_id, created_at, used)
             VALUES (?, ?, ?, FALSE)",
        )
        .bind(&code)
        .bind(user_id)
        .bind(&now)
        .execute(pool)
        .await?;

        Self::find_by_code(pool, &code)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_code(
        pool: &sqlx::SqlitePool,
        code: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Invite>(
            "SELECT id, invite_code, user_id, created_at, used, used_by, used_at
             FROM invites WHERE invite_code = ?",
        )
        .bind(code)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_user(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Invite>(
            "SELECT id, invite_code, user_id, created_at, used, used_by, used_at
             FROM invites WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// One-time redemption: unknown, already-used, and self-redeemed codes
    /// all return `None` with no state change. On success the code flips to
    /// used and, when invitations are enabled, the creator is credited the
    /// configured points with an `invite` history entry. Returns the
    /// inviter's user id. There is no undo.
    pub async fn redeem(
        pool: &sqlx::SqlitePool,
        code: &str,
        new_user_id: i64,
    ) -> Result<Option<i64>, sqlx::Error> {
        let Some(invite) = Self::find_by_code(pool, code).await? else {
            return Ok(None);
        };
        if invite.used || invite.user_id == new_user_id {
            return Ok(None);
        }

        let invitation_enabled = Setting::get_bool(pool, "invitation_enabled", true).await?;
        let invitation_points = Setting::get_i64(pool, "invitation_points", 5).await?;

        let mut tx = pool.begin().await?;

        // Guard on used = FALSE a second time inside the transaction so a
        // concurrent redemption of the same code cannot double-credit.
        let updated = sqlx::query(
            "UPDATE invites SET used = TRUE, used_by = ?, used_at = ?
             WHERE invite_code = ? AND used = FALSE",
        )
        .bind(new_user_id)
        .bind(Utc::now().to_rfc3339())
        .bind(code)
        .execute(&mut tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        if invitation_enabled && invitation_points > 0 {
            sqlx::query("UPDATE users SET points = points + ? WHERE user_id = ?")
                .bind(invitation_points)
                .bind(invite.user_id)
                .execute(&mut tx)
                .await?;

            sqlx::query(
                "INSERT INTO points_history (user_id, points, game_type, response_time, timestamp)
                 VALUES (?, ?, 'invite', NULL, ?)",
            )
            .bind(invite.user_id)
            .bind(invitation_points)
            .bind(Utc::now().to_rfc3339())
            .execute(&mut tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(invite.user_id))
    }

    /// Top inviters by number of redeemed codes.
    pub async fn leaderboard(
        pool: &sqlx::SqlitePool,
        limit: i64,
    ) -> Result<Vec<InviterStanding>, sqlx::Error> {
        sqlx::query_as::<_, InviterStanding>(
            r#"
            SELECT u.user_id, u.username, u.first_name, COUNT(i.id) AS invite_count
            FROM users u
            JOIN invites i ON u.user_id = i.user_id
            WHERE i.used = TRUE
            GROUP BY u.user_id, u.username, u.first_name
            ORDER BY invite_count DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}

fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}
