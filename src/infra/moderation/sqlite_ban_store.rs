// SQLite-backed ban ledger storage.
//
// Tables:
// - bans: one row per ban, never deleted. `active` is cleared on unban,
//   expiry is checked in the query against the caller's `now`.

use super::{from_db_time, to_db_time};
use crate::core::moderation::{BanRecord, BanStore, BanType, ModerationError, NewBan};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteBanStore {
    pool: Pool<Sqlite>,
}

impl SqliteBanStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), ModerationError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                reason TEXT NOT NULL,
                ban_type TEXT NOT NULL,
                expires_at TEXT,
                created_at TEXT NOT NULL,
                active BOOLEAN NOT NULL DEFAULT 1
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_bans_user ON bans(user_id, active)")
            .execute(&self.pool)
            .await
            .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl BanStore for SqliteBanStore {
    async fn insert_ban(&self, ban: NewBan) -> Result<BanRecord, ModerationError> {
        let result = sqlx::query(
            r#"
            INSERT INTO bans (user_id, reason, ban_type, expires_at, created_at, active)
            VALUES (?, ?, ?, ?, ?, 1)
            "#,
        )
        .bind(ban.user_id as i64)
        .bind(&ban.reason)
        .bind(ban.ban_type.as_str())
        .bind(ban.expires_at.map(to_db_time))
        .bind(to_db_time(ban.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        Ok(BanRecord {
            id: result.last_insert_rowid() as u64,
            user_id: ban.user_id,
            reason: ban.reason,
            ban_type: ban.ban_type,
            expires_at: ban.expires_at,
            created_at: ban.created_at,
            active: true,
        })
    }

    async fn find_active_ban(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<Option<BanRecord>, ModerationError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, reason, ban_type, expires_at, created_at, active
            FROM bans
            WHERE user_id = ? AND active = 1 AND (expires_at IS NULL OR expires_at > ?)
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id as i64)
        .bind(to_db_time(now))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        row.as_ref().map(row_to_ban).transpose()
    }

    async fn list_bans(&self, user_id: u64) -> Result<Vec<BanRecord>, ModerationError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, reason, ban_type, expires_at, created_at, active
            FROM bans
            WHERE user_id = ?
            ORDER BY id DESC
            "#,
        )
        .bind(user_id as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        rows.iter().map(row_to_ban).collect()
    }

    async fn deactivate_ban(&self, ban_id: u64) -> Result<bool, ModerationError> {
        let result = sqlx::query("UPDATE bans SET active = 0 WHERE id = ?")
            .bind(ban_id as i64)
            .execute(&self.pool)
            .await
            .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_ban(row: &SqliteRow) -> Result<BanRecord, ModerationError> {
    let ban_type: String = row.get("ban_type");
    let ban_type: BanType = ban_type
        .parse()
        .map_err(|e: ModerationError| ModerationError::StorageError(e.to_string()))?;

    let expires_at = row
        .get::<Option<String>, _>("expires_at")
        .map(|value| from_db_time(&value))
        .transpose()?;

    // Permanent bans and only permanent bans have no expiry
    if (ban_type == BanType::Permanent) != expires_at.is_none() {
        return Err(ModerationError::StorageError(format!(
            "ban {} has inconsistent expiry for type {}",
            row.get::<i64, _>("id"),
            ban_type
        )));
    }

    Ok(BanRecord {
        id: row.get::<i64, _>("id") as u64,
        user_id: row.get::<i64, _>("user_id") as u64,
        reason: row.get("reason"),
        ban_type,
        expires_at,
        created_at: from_db_time(&row.get::<String, _>("created_at"))?,
        active: row.get("active"),
    })
}
