// Moderation domain models - data structures for the guardian system.
//
// These are pure domain types with no storage or transport dependencies.
// The infra layer persists them, the console layer prints them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hours a temporary ban stays in effect unless the config overrides it.
pub const TEMP_BAN_DURATION_HOURS: i64 = 24;

/// Upper bound for a configured temporary ban (ten years). Keeps expiries
/// inside the four-digit-year range the stores compare as text.
pub const MAX_TEMP_BAN_HOURS: i64 = 87_600;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error, PartialEq)]
pub enum ModerationError {
    /// Content was rejected and an automated ban was recorded.
    #[error("{reason}. account temp-banned for {ban_duration_hours}h.")]
    PolicyViolation {
        reason: String,
        ban_duration_hours: i64,
    },

    /// The user has a ban in effect.
    #[error("account is banned: {reason}{}", appeal_suffix(.appeal_contact))]
    AccountBanned {
        reason: String,
        appeal_contact: Option<String>,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

fn appeal_suffix(contact: &Option<String>) -> String {
    match contact {
        Some(contact) => format!(". contact {} to appeal.", contact),
        None => String::new(),
    }
}

// ============================================================================
// VERDICTS
// ============================================================================

/// Result of scanning a piece of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationVerdict {
    /// Whether the content violates policy
    pub flagged: bool,
    /// Human-readable reason, only set when flagged
    pub reason: Option<String>,
}

impl ModerationVerdict {
    /// Create a "clean" verdict
    pub fn clean() -> Self {
        Self {
            flagged: false,
            reason: None,
        }
    }

    /// Create a flagged verdict
    pub fn flagged(reason: impl Into<String>) -> Self {
        Self {
            flagged: true,
            reason: Some(reason.into()),
        }
    }
}

// ============================================================================
// BANS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BanType {
    Temporary,
    Permanent,
}

impl BanType {
    /// Expiry for a ban of this type issued at `issued_at`.
    /// Permanent bans never expire.
    pub fn expiry(
        self,
        issued_at: DateTime<Utc>,
        temp_hours: i64,
    ) -> Result<Option<DateTime<Utc>>, ModerationError> {
        match self {
            BanType::Temporary => {
                if !(1..=MAX_TEMP_BAN_HOURS).contains(&temp_hours) {
                    return Err(ModerationError::InvalidInput(format!(
                        "temporary ban length must be 1..={} hours, got {}",
                        MAX_TEMP_BAN_HOURS, temp_hours
                    )));
                }
                Duration::try_hours(temp_hours)
                    .and_then(|length| issued_at.checked_add_signed(length))
                    .map(Some)
                    .ok_or_else(|| {
                        ModerationError::InvalidInput(format!(
                            "ban expiry out of range: {} + {}h",
                            issued_at, temp_hours
                        ))
                    })
            }
            BanType::Permanent => Ok(None),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BanType::Temporary => "temporary",
            BanType::Permanent => "permanent",
        }
    }
}

impl std::fmt::Display for BanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BanType {
    type Err = ModerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "temporary" | "temp" => Ok(BanType::Temporary),
            "permanent" | "perm" => Ok(BanType::Permanent),
            other => Err(ModerationError::InvalidInput(format!(
                "unknown ban type: {}",
                other
            ))),
        }
    }
}

/// A ban that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewBan {
    pub user_id: u64,
    pub reason: String,
    pub ban_type: BanType,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A stored ban.
///
/// `expires_at` is `None` exactly when `ban_type` is `Permanent`. Records are
/// never deleted; an administrative unban only clears `active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BanRecord {
    pub id: u64,
    pub user_id: u64,
    pub reason: String,
    pub ban_type: BanType,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub active: bool,
}

impl BanRecord {
    /// Whether this ban blocks the user at `now`.
    ///
    /// Expiry is never swept: a temporary record keeps `active = true` in
    /// storage after it lapses, so every reader must go through this check
    /// (or the equivalent SQL predicate) with the current time.
    pub fn is_in_effect(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at.map_or(true, |expires| expires > now)
    }
}

// ============================================================================
// POSTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Active,
    Flagged,
    Deleted,
}

impl PostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Active => "active",
            PostStatus::Flagged => "flagged",
            PostStatus::Deleted => "deleted",
        }
    }
}

impl std::str::FromStr for PostStatus {
    type Err = ModerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(PostStatus::Active),
            "flagged" => Ok(PostStatus::Flagged),
            "deleted" => Ok(PostStatus::Deleted),
            other => Err(ModerationError::InvalidInput(format!(
                "unknown post status: {}",
                other
            ))),
        }
    }
}

/// A post that passed moderation but has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: u64,
    /// Sanitized content
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub author_id: u64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub status: PostStatus,
}

// ============================================================================
// CONFIG
// ============================================================================

/// Terms that trigger a policy violation, in evaluation order.
pub const DEFAULT_DENYLIST: &[&str] = &[
    "illegal",
    "exploit",
    "malware",
    "virus",
    "jeffrey-epstein",
    "nsfw",
    "porn",
    "nude",
    "hentai",
    "sex",
    "darkweb",
    "torlink",
    "crypto-scam",
    "phishing",
    "ransomware",
    "carding",
    "hitman",
    "terrorism",
    "extremist",
    "pedophilia",
    "child-abuse",
    "snuff",
    "bestiality",
    "incest",
    "rape",
    "assault",
    "murder",
    "gore",
    "suicide-guide",
    "drugs-sale",
    "weapon-sale",
    "ddos-service",
    "botnet",
    "stealer",
    "keylogger",
    "zero-day",
    "warehouse-leaks",
    "4chan",
    "8kun",
    "8chan",
    "4ch",
    "bbc",
    "tentacle",
    "anal",
    "milf",
    "brazzers",
    "pornhub",
    "xvideos",
    "redtube",
    "youjizz",
    "xnxx",
];

/// Configuration for the guardian system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardianConfig {
    /// Substrings that flag content, checked in order
    pub denylist: Vec<String>,
    /// Content with more links than this is flagged
    pub max_links: usize,
    /// Lifetime of an automated temporary ban
    pub temp_ban_hours: i64,
    /// Minimum trimmed length of a submission
    pub min_content_length: usize,
    /// Refuse submissions from users with a ban in effect
    pub block_banned_authors: bool,
    /// Address appended to login refusals, e.g. `support@example.org`
    pub appeal_contact: Option<String>,
    /// Default number of posts returned by the feed
    pub feed_limit: usize,
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self {
            denylist: DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect(),
            max_links: 3,
            temp_ban_hours: TEMP_BAN_DURATION_HOURS,
            min_content_length: 5,
            block_banned_authors: false,
            appeal_contact: None,
            feed_limit: 50,
        }
    }
}
