// Implementations for the moderation stores.

pub mod in_memory;
pub mod sqlite_ban_store;
pub mod sqlite_post_store;

// Re-export for convenience
pub use in_memory::{InMemoryBanStore, InMemoryPostStore};
pub use sqlite_ban_store::SqliteBanStore;
pub use sqlite_post_store::SqlitePostStore;

use crate::core::moderation::ModerationError;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::Path;

/// Open a pool on a SQLite file (created if missing) or `:memory:`.
///
/// An in-memory database lives inside a single connection, so the pool is
/// capped at one connection that is never recycled in that case.
pub async fn open_pool(database_url: &str) -> anyhow::Result<Pool<Sqlite>> {
    let in_memory = database_url.contains(":memory:");
    let path_str = database_url.trim_start_matches("sqlite://");
    if !in_memory && !Path::new(path_str).exists() {
        if let Some(parent) = Path::new(path_str).parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::File::create(path_str)?;
    }

    let conn_str = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite://{}", database_url)
    };

    let mut options = SqlitePoolOptions::new();
    if in_memory {
        options = options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    Ok(options.connect(&conn_str).await?)
}

/// Fixed-width UTC timestamps so string comparison in SQL orders correctly.
pub(crate) fn to_db_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn from_db_time(value: &str) -> Result<DateTime<Utc>, ModerationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ModerationError::StorageError(format!("bad timestamp {:?}: {}", value, e)))
}
