// Ban ledger - append-only ban records with lazy expiry.
//
// Records are inserted by the moderation gate (automated bans) or by an
// operator (manual bans). They are never deleted; the only mutation is an
// administrative unban that clears the `active` flag.
//
// Expiry is evaluated at read time against the clock. Nothing sweeps
// lapsed temporary bans, so do not cache `is_banned` results across requests.

use super::clock::Clock;
use super::moderation_models::{BanRecord, BanType, ModerationError, NewBan};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait BanStore: Send + Sync {
    /// Insert a new active ban and return the stored record.
    async fn insert_ban(&self, ban: NewBan) -> Result<BanRecord, ModerationError>;

    /// The most recent ban for a user that is active and not expired at `now`.
    async fn find_active_ban(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<Option<BanRecord>, ModerationError>;

    /// All bans for a user, newest first, regardless of state.
    async fn list_bans(&self, user_id: u64) -> Result<Vec<BanRecord>, ModerationError>;

    /// Clear the active flag on a ban. Returns false if no such ban exists.
    async fn deactivate_ban(&self, ban_id: u64) -> Result<bool, ModerationError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct BanLedger<S: BanStore> {
    store: S,
    clock: Arc<dyn Clock>,
    temp_ban_hours: i64,
    appeal_contact: Option<String>,
}

impl<S: BanStore> BanLedger<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>, temp_ban_hours: i64) -> Self {
        Self {
            store,
            clock,
            temp_ban_hours,
            appeal_contact: None,
        }
    }

    /// Contact shown to users whose login is refused.
    pub fn with_appeal_contact(mut self, contact: Option<String>) -> Self {
        self.appeal_contact = contact;
        self
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    pub fn temp_ban_hours(&self) -> i64 {
        self.temp_ban_hours
    }

    /// Record a new active ban.
    ///
    /// Temporary bans expire `temp_ban_hours` after issue; permanent bans
    /// never expire. Existing bans for the user are left untouched.
    pub async fn record_ban(
        &self,
        user_id: u64,
        reason: &str,
        ban_type: BanType,
    ) -> Result<BanRecord, ModerationError> {
        if user_id == 0 {
            return Err(ModerationError::InvalidInput("missing user id".to_string()));
        }

        let now = self.clock.now();
        let ban = NewBan {
            user_id,
            reason: reason.to_string(),
            ban_type,
            expires_at: ban_type.expiry(now, self.temp_ban_hours)?,
            created_at: now,
        };

        let record = self.store.insert_ban(ban).await?;
        tracing::info!(
            user_id,
            ban_id = record.id,
            ban_type = %record.ban_type,
            "Ban recorded"
        );
        Ok(record)
    }

    /// Point-in-time check against the current clock.
    pub async fn is_banned(&self, user_id: u64) -> Result<bool, ModerationError> {
        Ok(self.get_active_ban(user_id).await?.is_some())
    }

    pub async fn get_active_ban(&self, user_id: u64) -> Result<Option<BanRecord>, ModerationError> {
        self.store
            .find_active_ban(user_id, self.clock.now())
            .await
    }

    /// Gate for the login flow: refuse a session while any ban is in effect,
    /// automated or manual.
    pub async fn check_login(&self, user_id: u64) -> Result<(), ModerationError> {
        match self.get_active_ban(user_id).await? {
            Some(ban) => Err(ModerationError::AccountBanned {
                reason: ban.reason,
                appeal_contact: self.appeal_contact.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Administrative unban.
    pub async fn lift_ban(&self, ban_id: u64) -> Result<bool, ModerationError> {
        let lifted = self.store.deactivate_ban(ban_id).await?;
        if lifted {
            tracing::info!(ban_id, "Ban lifted");
        }
        Ok(lifted)
    }

    pub async fn ban_history(&self, user_id: u64) -> Result<Vec<BanRecord>, ModerationError> {
        self.store.list_bans(user_id).await
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::clock::ManualClock;
    use crate::core::moderation::TEMP_BAN_DURATION_HOURS;
    use chrono::{Duration, TimeZone};
    use dashmap::DashMap;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// In-memory store for testing
    struct MockBanStore {
        bans: DashMap<u64, BanRecord>,
        next_id: AtomicU64,
    }

    impl MockBanStore {
        fn new() -> Self {
            Self {
                bans: DashMap::new(),
                next_id: AtomicU64::new(1),
            }
        }
    }

    #[async_trait]
    impl BanStore for MockBanStore {
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
                .filter(|b| b.user_id == user_id && b.is_in_effect(now))
                .max_by_key(|b| b.id)
                .map(|b| b.clone()))
        }

        async fn list_bans(&self, user_id: u64) -> Result<Vec<BanRecord>, ModerationError> {
            let mut bans: Vec<BanRecord> = self
                .bans
                .iter()
                .filter(|b| b.user_id == user_id)
                .map(|b| b.clone())
                .collect();
            bans.sort_by(|a, b| b.id.cmp(&a.id));
            Ok(bans)
        }

        async fn deactivate_ban(&self, ban_id: u64) -> Result<bool, ModerationError> {
            Ok(self
                .bans
                .get_mut(&ban_id)
                .map(|mut b| b.active = false)
                .is_some())
        }
    }

    fn ledger() -> (BanLedger<MockBanStore>, Arc<ManualClock>) {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let ledger = BanLedger::new(MockBanStore::new(), clock.clone(), TEMP_BAN_DURATION_HOURS);
        (ledger, clock)
    }

    #[tokio::test]
    async fn test_temporary_ban_sets_expiry() {
        let (ledger, clock) = ledger();
        let ban = ledger
            .record_ban(5, "spam", BanType::Temporary)
            .await
            .unwrap();

        assert!(ban.active);
        assert_eq!(ban.created_at, clock.now());
        assert_eq!(ban.expires_at, Some(clock.now() + Duration::hours(24)));
    }

    #[tokio::test]
    async fn test_temporary_ban_expires_lazily() {
        let (ledger, clock) = ledger();
        ledger
            .record_ban(5, "spam", BanType::Temporary)
            .await
            .unwrap();
        assert!(ledger.is_banned(5).await.unwrap());

        clock.advance(Duration::hours(24) + Duration::seconds(1));
        assert!(!ledger.is_banned(5).await.unwrap());

        // Record is untouched in storage
        let history = ledger.ban_history(5).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].active);
    }

    #[tokio::test]
    async fn test_permanent_ban_never_expires() {
        let (ledger, clock) = ledger();
        let ban = ledger
            .record_ban(5, "test", BanType::Permanent)
            .await
            .unwrap();
        assert_eq!(ban.expires_at, None);

        clock.advance(Duration::days(365 * 20));
        assert!(ledger.is_banned(5).await.unwrap());
    }

    #[tokio::test]
    async fn test_bans_are_per_user() {
        let (ledger, _) = ledger();
        ledger
            .record_ban(5, "spam", BanType::Permanent)
            .await
            .unwrap();
        assert!(!ledger.is_banned(6).await.unwrap());
    }

    #[tokio::test]
    async fn test_repeat_bans_are_independent() {
        let (ledger, clock) = ledger();
        ledger
            .record_ban(5, "first", BanType::Temporary)
            .await
            .unwrap();
        clock.advance(Duration::hours(12));
        ledger
            .record_ban(5, "second", BanType::Temporary)
            .await
            .unwrap();

        // First lapses, second still holds
        clock.advance(Duration::hours(13));
        let active = ledger.get_active_ban(5).await.unwrap().unwrap();
        assert_eq!(active.reason, "second");
        assert_eq!(ledger.ban_history(5).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_login_refused_with_reason() {
        let (ledger, _) = ledger();
        assert!(ledger.check_login(5).await.is_ok());

        ledger
            .record_ban(5, "manual review", BanType::Permanent)
            .await
            .unwrap();
        let err = ledger.check_login(5).await.unwrap_err();
        assert_eq!(
            err,
            ModerationError::AccountBanned {
                reason: "manual review".to_string(),
                appeal_contact: None,
            }
        );
    }

    #[tokio::test]
    async fn test_login_refusal_carries_appeal_contact() {
        let (ledger, _) = ledger();
        let ledger = ledger.with_appeal_contact(Some("appeals@example.org".to_string()));
        ledger
            .record_ban(5, "manual review", BanType::Permanent)
            .await
            .unwrap();

        let err = ledger.check_login(5).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "account is banned: manual review. contact appeals@example.org to appeal."
        );
    }

    #[tokio::test]
    async fn test_oversized_ban_length_records_nothing() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        ));
        let ledger = BanLedger::new(MockBanStore::new(), clock, 1_000_000_000_000_000);

        let err = ledger
            .record_ban(5, "violates policy: malware", BanType::Temporary)
            .await
            .unwrap_err();
        assert!(matches!(err, ModerationError::InvalidInput(_)));
        assert!(ledger.ban_history(5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lift_ban() {
        let (ledger, _) = ledger();
        let ban = ledger
            .record_ban(5, "test", BanType::Permanent)
            .await
            .unwrap();

        assert!(ledger.lift_ban(ban.id).await.unwrap());
        assert!(!ledger.is_banned(5).await.unwrap());
        assert!(!ledger.lift_ban(999).await.unwrap());

        // Lifting keeps the record
        assert_eq!(ledger.ban_history(5).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_user_rejected() {
        let (ledger, _) = ledger();
        let err = ledger
            .record_ban(0, "test", BanType::Temporary)
            .await
            .unwrap_err();
        assert!(matches!(err, ModerationError::InvalidInput(_)));
    }
}
