// SQLite-backed post storage.
//
// Tables:
// - posts: accepted posts. Moderation changes `status`, rows are never removed.

use super::{from_db_time, to_db_time};
use crate::core::moderation::{ModerationError, NewPost, Post, PostStatus, PostStore};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

pub struct SqlitePostStore {
    pool: Pool<Sqlite>,
}

impl SqlitePostStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), ModerationError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'active'
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_posts_status ON posts(status, created_at)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl PostStore for SqlitePostStore {
    async fn insert_post(&self, post: NewPost) -> Result<Post, ModerationError> {
        let result = sqlx::query(
            r#"
            INSERT INTO posts (user_id, content, created_at, status)
            VALUES (?, ?, ?, 'active')
            "#,
        )
        .bind(post.author_id as i64)
        .bind(&post.content)
        .bind(to_db_time(post.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        Ok(Post {
            id: result.last_insert_rowid() as u64,
            author_id: post.author_id,
            content: post.content,
            created_at: post.created_at,
            status: PostStatus::Active,
        })
    }

    async fn list_active_posts(&self, limit: usize) -> Result<Vec<Post>, ModerationError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, content, created_at, status
            FROM posts
            WHERE status = 'active'
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        rows.iter().map(row_to_post).collect()
    }

    async fn get_post(&self, post_id: u64) -> Result<Option<Post>, ModerationError> {
        let row = sqlx::query(
            "SELECT id, user_id, content, created_at, status FROM posts WHERE id = ?",
        )
        .bind(post_id as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        row.as_ref().map(row_to_post).transpose()
    }

    async fn set_post_status(
        &self,
        post_id: u64,
        status: PostStatus,
    ) -> Result<bool, ModerationError> {
        let result = sqlx::query("UPDATE posts SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(post_id as i64)
            .execute(&self.pool)
            .await
            .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_post(row: &SqliteRow) -> Result<Post, ModerationError> {
    let status: String = row.get("status");
    let status: PostStatus = status
        .parse()
        .map_err(|e: ModerationError| ModerationError::StorageError(e.to_string()))?;

    Ok(Post {
        id: row.get::<i64, _>("id") as u64,
        author_id: row.get::<i64, _>("user_id") as u64,
        content: row.get("content"),
        created_at: from_db_time(&row.get::<String, _>("created_at"))?,
        status,
    })
}
