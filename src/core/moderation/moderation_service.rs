// Moderation gate - the only path by which a post gets created.
//
// Per submission:
// - Validate input
// - Sanitize markup
// - Scan the sanitized text
// - Flagged: record a temporary ban and reject, nothing is stored
// - Clean: store the post as active
//
// Each outcome is a single write, so a submission either leaves one post or
// one ban behind, never both.

use super::ban_ledger::{BanLedger, BanStore};
use super::clock::Clock;
use super::moderation_models::{
    BanType, GuardianConfig, ModerationError, NewPost, Post, PostStatus,
};
use super::sanitizer::sanitize;
use super::scanner::ContentScanner;
use async_trait::async_trait;
use std::sync::Arc;

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Store a post with `status = active`.
    async fn insert_post(&self, post: NewPost) -> Result<Post, ModerationError>;

    /// Active posts, newest first.
    async fn list_active_posts(&self, limit: usize) -> Result<Vec<Post>, ModerationError>;

    async fn get_post(&self, post_id: u64) -> Result<Option<Post>, ModerationError>;

    /// Returns false if no such post exists.
    async fn set_post_status(
        &self,
        post_id: u64,
        status: PostStatus,
    ) -> Result<bool, ModerationError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct ModerationGate<B: BanStore, P: PostStore> {
    scanner: ContentScanner,
    ledger: BanLedger<B>,
    posts: P,
    clock: Arc<dyn Clock>,
    config: GuardianConfig,
}

impl<B: BanStore, P: PostStore> ModerationGate<B, P> {
    pub fn new(config: GuardianConfig, bans: B, posts: P, clock: Arc<dyn Clock>) -> Self {
        Self {
            scanner: ContentScanner::from_config(&config),
            ledger: BanLedger::new(bans, Arc::clone(&clock), config.temp_ban_hours)
                .with_appeal_contact(config.appeal_contact.clone()),
            posts,
            clock,
            config,
        }
    }

    /// The ban ledger, shared with the login flow.
    pub fn ledger(&self) -> &BanLedger<B> {
        &self.ledger
    }

    /// Submit a post on behalf of an authenticated user.
    ///
    /// Flagged content never reaches the post store; instead a new temporary
    /// ban is recorded and `PolicyViolation` is returned. Users who already
    /// hold a ban are only refused up front when `block_banned_authors` is
    /// set, otherwise each violating attempt adds another independent ban.
    pub async fn submit_post(
        &self,
        user_id: u64,
        raw_content: &str,
    ) -> Result<Post, ModerationError> {
        self.validate(user_id, raw_content)?;

        if self.config.block_banned_authors {
            self.ledger.check_login(user_id).await?;
        }

        let content = sanitize(raw_content);
        // Markup-only input can sanitize down to nothing
        self.check_length(&content)?;

        let verdict = self.scanner.scan(&content);
        tracing::debug!(user_id, flagged = verdict.flagged, reason = ?verdict.reason, "Content scanned");

        if verdict.flagged {
            let reason = verdict.reason.unwrap_or_else(|| "violates policy".to_string());
            let ban = self
                .ledger
                .record_ban(user_id, &reason, BanType::Temporary)
                .await?;

            tracing::warn!(
                user_id,
                ban_id = ban.id,
                reason = %reason,
                "Automated temporary ban issued"
            );

            return Err(ModerationError::PolicyViolation {
                reason,
                ban_duration_hours: self.ledger.temp_ban_hours(),
            });
        }

        let post = self
            .posts
            .insert_post(NewPost {
                author_id: user_id,
                content,
                created_at: self.clock.now(),
            })
            .await?;

        tracing::info!(user_id, post_id = post.id, "Post accepted");
        Ok(post)
    }

    fn validate(&self, user_id: u64, raw_content: &str) -> Result<(), ModerationError> {
        if user_id == 0 {
            return Err(ModerationError::InvalidInput("missing user id".to_string()));
        }

        self.check_length(raw_content)
    }

    fn check_length(&self, content: &str) -> Result<(), ModerationError> {
        if content.trim().chars().count() < self.config.min_content_length {
            return Err(ModerationError::InvalidInput(format!(
                "content too brief: at least {} characters required",
                self.config.min_content_length
            )));
        }
        Ok(())
    }

    /// Active posts, newest first. `None` uses the configured page size.
    pub async fn feed(&self, limit: Option<usize>) -> Result<Vec<Post>, ModerationError> {
        let limit = limit.unwrap_or(self.config.feed_limit);
        self.posts.list_active_posts(limit).await
    }

    pub async fn get_post(&self, post_id: u64) -> Result<Option<Post>, ModerationError> {
        self.posts.get_post(post_id).await
    }

    /// Moderator action on an existing post. Posts are hidden, never removed.
    pub async fn set_post_status(
        &self,
        post_id: u64,
        status: PostStatus,
    ) -> Result<bool, ModerationError> {
        let updated = self.posts.set_post_status(post_id, status).await?;
        if updated {
            tracing::info!(post_id, status = status.as_str(), "Post status changed");
        }
        Ok(updated)
    }
}

// ============================================================================
// TESTS
// ============================================================================
