// In-memory implementations of BanStore and PostStore.
//
// Used when no database path is configured and by the console tests.
// Same contract as the SQLite stores, nothing survives a restart.

use crate::core::moderation::{
    BanRecord, BanStore, ModerationError, NewBan, NewPost, Post, PostStatus, PostStore,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Bans keyed by id. Ids start at 1 like SQLite rowids.
pub struct InMemoryBanStore {
    bans: DashMap<u64, BanRecord>,
    next_id: AtomicU64,
}

impl InMemoryBanStore {
    pub fn new() -> Self {
        Self {
            bans: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryBanStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BanStore for InMemoryBanStore {
    async fn insert_ban(&self, ban: NewBan) -> Result<BanRecord, ModerationError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = BanRecord {
            id,
            user_id: ban.user_id,
            reason: ban.reason,
            ban_type: ban.ban_type,
            expires_at: ban.expires_at,
            created_at: ban.created_at,
            active: true,
        };
        self.bans.insert(id, record.clone());
        Ok(record)
    }

    async fn find_active_ban(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<Option<BanRecord>, ModerationError> {
        Ok(self
            .bans
            .iter()
            .filter(|entry| entry.user_id == user_id && entry.is_in_effect(now))
            .max_by_key(|entry| entry.id)
            .map(|entry| entry.value().clone()))
    }

    async fn list_bans(&self, user_id: u64) -> Result<Vec<BanRecord>, ModerationError> {
        let mut bans: Vec<BanRecord> = self
            .bans
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();

        // Newest first
        bans.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(bans)
    }

    async fn deactivate_ban(&self, ban_id: u64) -> Result<bool, ModerationError> {
        match self.bans.get_mut(&ban_id) {
            Some(mut entry) => {
                entry.active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Posts keyed by id.
pub struct InMemoryPostStore {
    posts: DashMap<u64, Post>,
    next_id: AtomicU64,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self {
            posts: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryPostStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn insert_post(&self, post: NewPost) -> Result<Post, ModerationError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let stored = Post {
            id,
            author_id: post.author_id,
            content: post.content,
            created_at: post.created_at,
            status: PostStatus::Active,
        };
        self.posts.insert(id, stored.clone());
        Ok(stored)
    }

    async fn list_active_posts(&self, limit: usize) -> Result<Vec<Post>, ModerationError> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|entry| entry.status == PostStatus::Active)
            .map(|entry| entry.value().clone())
            .collect();

        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        posts.truncate(limit);
        Ok(posts)
    }

    async fn get_post(&self, post_id: u64) -> Result<Option<Post>, ModerationError> {
        Ok(self.posts.get(&post_id).map(|entry| entry.value().clone()))
    }

    async fn set_post_status(
        &self,
        post_id: u64,
        status: PostStatus,
    ) -> Result<bool, ModerationError> {
        match self.posts.get_mut(&post_id) {
            Some(mut entry) => {
                entry.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::BanType;
    use chrono::{Duration, TimeZone};

    fn new_ban(user_id: u64, ban_type: BanType, created_at: DateTime<Utc>) -> NewBan {
        NewBan {
            user_id,
            reason: format!("{} ban", ban_type),
            ban_type,
            expires_at: ban_type.expiry(created_at, 24).unwrap(),
            created_at,
        }
    }

    #[tokio::test]
    async fn test_ban_ids_start_at_one() {
        let store = InMemoryBanStore::new();
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

        let first = store
            .insert_ban(new_ban(1, BanType::Temporary, now))
            .await
            .unwrap();
        let second = store
            .insert_ban(new_ban(1, BanType::Permanent, now))
            .await
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(first.active && second.active);
    }

    #[tokio::test]
    async fn test_find_active_ban_prefers_newest() {
        let store = InMemoryBanStore::new();
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        store
            .insert_ban(new_ban(1, BanType::Permanent, now))
            .await
            .unwrap();
        let newer = store
            .insert_ban(new_ban(1, BanType::Temporary, now))
            .await
            .unwrap();

        let found = store.find_active_ban(1, now).await.unwrap().unwrap();
        assert_eq!(found.id, newer.id);

        // Once the temporary one lapses the permanent one shows through
        let later = now + Duration::hours(48);
        let found = store.find_active_ban(1, later).await.unwrap().unwrap();
        assert_eq!(found.ban_type, BanType::Permanent);
    }

    #[tokio::test]
    async fn test_deactivate_ban() {
        let store = InMemoryBanStore::new();
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let ban = store
            .insert_ban(new_ban(1, BanType::Permanent, now))
            .await
            .unwrap();

        assert!(store.deactivate_ban(ban.id).await.unwrap());
        assert!(store.find_active_ban(1, now).await.unwrap().is_none());
        assert!(!store.deactivate_ban(42).await.unwrap());
        assert!(!store.list_bans(1).await.unwrap()[0].active);
    }

    #[tokio::test]
    async fn test_feed_order_and_filter() {
        let store = InMemoryPostStore::new();
        let t0 = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

        for (i, author) in [10u64, 11, 12].iter().enumerate() {
            store
                .insert_post(NewPost {
                    author_id: *author,
                    content: format!("post {}", i),
                    created_at: t0 + Duration::minutes(i as i64),
                })
                .await
                .unwrap();
        }
        store.set_post_status(3, PostStatus::Flagged).await.unwrap();

        let feed = store.list_active_posts(10).await.unwrap();
        let authors: Vec<u64> = feed.iter().map(|p| p.author_id).collect();
        assert_eq!(authors, vec![11, 10]);
    }
}
