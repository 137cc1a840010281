//! LocalStore: the persistence contract for users, goals, logs, stats and
//! the single client session.
//!
//! Each collection is one JSON array under a fixed storage key (the session
//! is a single object). Every write is a whole-blob read-modify-write, so
//! writers are serialized through `write_lock`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::clock::Clock;
use crate::models::{DailyGoal, Session, TimeRange, User, UserBehaviorStats, WaterLog};
use crate::storage::{KeyValueStorage, StorageError};
use crate::tracking::aggregation::local_date;

pub const USERS_KEY: &str = "aquadaily_users";
pub const LOGS_KEY: &str = "aquadaily_logs";
pub const GOALS_KEY: &str = "aquadaily_goals";
pub const STATS_KEY: &str = "aquadaily_stats";
pub const SESSION_KEY: &str = "aquadaily_session";

const COLLECTION_KEYS: [&str; 4] = [USERS_KEY, LOGS_KEY, GOALS_KEY, STATS_KEY];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("User already exists")]
    DuplicateUser,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{field} must be a positive number of millilitres")]
    InvalidQuantity { field: &'static str },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Corrupt data under storage key '{key}': {source}")]
    Corrupt {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Clone)]
pub struct LocalStore {
    storage: Arc<dyn KeyValueStorage>,
    clock: Arc<dyn Clock>,
    write_lock: Arc<Mutex<()>>,
}

impl LocalStore {
    /// Wraps `storage` and seeds any missing collection key with `[]`.
    pub async fn open(
        storage: Arc<dyn KeyValueStorage>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        for key in COLLECTION_KEYS {
            if storage.get(key).await?.is_none() {
                storage.set(key, "[]").await?;
                debug!("Seeded empty collection {key}");
            }
        }
        Ok(Self {
            storage,
            clock,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    // ── Auth ────────────────────────────────────────────────────────────────

    /// Creates a user with a default goal and stats row, then makes it the
    /// active session.
    ///
    /// The password is accepted but never stored, so `login` cannot check it.
    pub async fn register(
        &self,
        email: &str,
        _password: &str,
        name: &str,
    ) -> Result<Session, StoreError> {
        if email.trim().is_empty() {
            return Err(StoreError::Validation("email cannot be empty".to_string()));
        }
        if name.trim().is_empty() {
            return Err(StoreError::Validation("name cannot be empty".to_string()));
        }

        let _guard = self.write_lock.lock().await;

        let mut users: Vec<User> = self.load(USERS_KEY).await?;
        if users.iter().any(|u| u.email == email) {
            return Err(StoreError::DuplicateUser);
        }

        let now = self.now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            created_at: now,
        };

        users.push(user.clone());
        self.save(USERS_KEY, &users).await?;

        let mut goals: Vec<DailyGoal> = self.load(GOALS_KEY).await?;
        goals.push(DailyGoal::default_for(user.id, now));
        self.save(GOALS_KEY, &goals).await?;

        let mut stats: Vec<UserBehaviorStats> = self.load(STATS_KEY).await?;
        stats.push(UserBehaviorStats::initial(user.id, now));
        self.save(STATS_KEY, &stats).await?;

        let session = self.start_session(user).await?;
        info!("Registered user {}", session.user.id);
        Ok(session)
    }

    /// Looks the user up by exact email and makes it the active session.
    pub async fn login(&self, email: &str, _password: &str) -> Result<Session, StoreError> {
        // TODO: verify the password once register persists a credential hash.
        let users: Vec<User> = self.load(USERS_KEY).await?;
        let user = users
            .into_iter()
            .find(|u| u.email == email)
            .ok_or(StoreError::InvalidCredentials)?;

        let _guard = self.write_lock.lock().await;
        let session = self.start_session(user).await?;
        info!("User {} logged in", session.user.id);
        Ok(session)
    }

    pub async fn logout(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.storage.remove(SESSION_KEY).await?;
        info!("Session cleared");
        Ok(())
    }

    pub async fn get_session(&self) -> Result<Option<Session>, StoreError> {
        match self.storage.get(SESSION_KEY).await? {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StoreError::Corrupt {
                    key: SESSION_KEY,
                    source,
                }),
            _ => Ok(None),
        }
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let users: Vec<User> = self.load(USERS_KEY).await?;
        Ok(users.into_iter().find(|u| u.id == user_id))
    }

    // ── Goals ───────────────────────────────────────────────────────────────

    /// Returns the stored goal, or an unsaved 2000 ml default.
    pub async fn get_daily_goal(&self, user_id: Uuid) -> Result<DailyGoal, StoreError> {
        let goals: Vec<DailyGoal> = self.load(GOALS_KEY).await?;
        Ok(goals
            .into_iter()
            .find(|g| g.user_id == user_id)
            .unwrap_or_else(|| DailyGoal::default_for(user_id, self.now_utc())))
    }

    /// Upserts the user's goal. Reminder frequency is always reset.
    pub async fn update_daily_goal(
        &self,
        user_id: Uuid,
        goal_ml: u32,
    ) -> Result<DailyGoal, StoreError> {
        if goal_ml == 0 {
            return Err(StoreError::InvalidQuantity { field: "goal_ml" });
        }

        let _guard = self.write_lock.lock().await;
        let mut goals: Vec<DailyGoal> = self.load(GOALS_KEY).await?;
        let updated = DailyGoal::new(user_id, goal_ml, self.now_utc());

        match goals.iter_mut().find(|g| g.user_id == user_id) {
            Some(existing) => *existing = updated.clone(),
            None => goals.push(updated.clone()),
        }
        self.save(GOALS_KEY, &goals).await?;

        info!("Daily goal for user {user_id} set to {goal_ml}ml");
        Ok(updated)
    }

    // ── Water logs ──────────────────────────────────────────────────────────

    /// Appends an intake event and touches the user's `last_logged_at`.
    ///
    /// Streak, average intake and consistency are not recomputed here.
    pub async fn log_water(&self, user_id: Uuid, amount_ml: u32) -> Result<WaterLog, StoreError> {
        if amount_ml == 0 {
            return Err(StoreError::InvalidQuantity { field: "amount_ml" });
        }

        let _guard = self.write_lock.lock().await;
        let now = self.now_utc();

        let mut logs: Vec<WaterLog> = self.load(LOGS_KEY).await?;
        let log = WaterLog {
            id: Uuid::new_v4(),
            user_id,
            amount_ml,
            created_at: now,
        };
        logs.push(log.clone());
        self.save(LOGS_KEY, &logs).await?;

        let mut stats: Vec<UserBehaviorStats> = self.load(STATS_KEY).await?;
        if let Some(row) = stats.iter_mut().find(|s| s.user_id == user_id) {
            row.last_logged_at = now;
            self.save(STATS_KEY, &stats).await?;
        }

        debug!("Logged {amount_ml}ml for user {user_id}");
        Ok(log)
    }

    /// Logs for `user_id` created within the trailing window of `range`,
    /// oldest first.
    pub async fn get_water_logs(
        &self,
        user_id: Uuid,
        range: TimeRange,
    ) -> Result<Vec<WaterLog>, StoreError> {
        let since = (self.clock.now() - range.span()).with_timezone(&Utc);
        let mut logs: Vec<WaterLog> = self.load(LOGS_KEY).await?;
        logs.retain(|l| l.user_id == user_id && l.created_at >= since);
        logs.sort_by_key(|l| l.created_at);
        Ok(logs)
    }

    /// Week-range logs whose local calendar date is today.
    pub async fn get_today_logs(&self, user_id: Uuid) -> Result<Vec<WaterLog>, StoreError> {
        let now = self.clock.now();
        let today = now.date_naive();
        let offset = *now.offset();
        let mut logs = self.get_water_logs(user_id, TimeRange::Week).await?;
        logs.retain(|l| local_date(l.created_at, &offset) == today);
        Ok(logs)
    }

    // ── Stats ───────────────────────────────────────────────────────────────

    pub async fn get_behavior_stats(
        &self,
        user_id: Uuid,
    ) -> Result<Option<UserBehaviorStats>, StoreError> {
        let stats: Vec<UserBehaviorStats> = self.load(STATS_KEY).await?;
        Ok(stats.into_iter().find(|s| s.user_id == user_id))
    }

    // ── Internals ───────────────────────────────────────────────────────────

    /// Caller must hold `write_lock`.
    async fn start_session(&self, user: User) -> Result<Session, StoreError> {
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            user,
        };
        let raw = serde_json::to_string(&session).map_err(StoreError::Serialize)?;
        self.storage.set(SESSION_KEY, &raw).await?;
        Ok(session)
    }

    async fn load<T: DeserializeOwned>(&self, key: &'static str) -> Result<Vec<T>, StoreError> {
        match self.storage.get(key).await? {
            Some(raw) if !raw.trim().is_empty() => {
                serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt { key, source })
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn save<T: Serialize>(&self, key: &'static str, rows: &[T]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(rows).map_err(StoreError::Serialize)?;
        self.storage.set(key, &raw).await?;
        Ok(())
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.clock.now().with_timezone(&Utc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryStorage;
    use chrono::Duration;

    async fn store_at(now: &str) -> (LocalStore, Arc<FixedClock>, MemoryStorage) {
        let storage = MemoryStorage::new();
        let clock = Arc::new(FixedClock::at(now));
        let store = LocalStore::open(Arc::new(storage.clone()), clock.clone())
            .await
            .unwrap();
        (store, clock, storage)
    }

    async fn raw_rows(storage: &MemoryStorage, key: &str) -> Vec<serde_json::Value> {
        let raw = storage.get(key).await.unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[tokio::test]
    async fn test_open_seeds_collections_but_not_session() {
        let (_store, _clock, storage) = store_at("2026-10-15T10:00:00+00:00").await;
        for key in COLLECTION_KEYS {
            assert_eq!(storage.get(key).await.unwrap().as_deref(), Some("[]"));
        }
        assert_eq!(storage.get(SESSION_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_open_keeps_existing_data() {
        let storage = MemoryStorage::new();
        storage.set(USERS_KEY, "[{\"bogus\":1}]").await.unwrap();
        let clock = Arc::new(FixedClock::at("2026-10-15T10:00:00+00:00"));
        LocalStore::open(Arc::new(storage.clone()), clock).await.unwrap();
        assert_eq!(
            storage.get(USERS_KEY).await.unwrap().as_deref(),
            Some("[{\"bogus\":1}]")
        );
    }

    #[tokio::test]
    async fn test_register_creates_user_goal_stats_and_session() {
        let (store, _clock, storage) = store_at("2026-10-15T10:00:00+00:00").await;
        let session = store.register("ana@example.com", "pw", "Ana").await.unwrap();

        assert_eq!(session.user.email, "ana@example.com");
        assert!(!session.token.is_empty());

        let goal = store.get_daily_goal(session.user.id).await.unwrap();
        assert_eq!(goal.goal_ml, 2000);
        assert_eq!(goal.reminder_frequency, 120);

        let stats = store
            .get_behavior_stats(session.user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stats.consistency_score, 50);
        assert_eq!(stats.streak_days, 0);

        assert_eq!(store.get_session().await.unwrap(), Some(session));
        assert_eq!(raw_rows(&storage, GOALS_KEY).await.len(), 1);
        assert_eq!(raw_rows(&storage, STATS_KEY).await.len(), 1);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_fails_and_leaves_users_unchanged() {
        let (store, _clock, storage) = store_at("2026-10-15T10:00:00+00:00").await;
        store.register("ana@example.com", "pw", "Ana").await.unwrap();
        let before = storage.get(USERS_KEY).await.unwrap();

        let err = store
            .register("ana@example.com", "other", "Ana Two")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUser));
        assert_eq!(storage.get(USERS_KEY).await.unwrap(), before);
        assert_eq!(raw_rows(&storage, GOALS_KEY).await.len(), 1);
    }

    #[tokio::test]
    async fn test_register_rejects_blank_fields() {
        let (store, _clock, _storage) = store_at("2026-10-15T10:00:00+00:00").await;
        assert!(matches!(
            store.register("  ", "pw", "Ana").await,
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            store.register("ana@example.com", "pw", "").await,
            Err(StoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_second_registration_replaces_session() {
        let (store, _clock, _storage) = store_at("2026-10-15T10:00:00+00:00").await;
        store.register("ana@example.com", "pw", "Ana").await.unwrap();
        let bo = store.register("bo@example.com", "pw", "Bo").await.unwrap();
        let active = store.get_session().await.unwrap().unwrap();
        assert_eq!(active.user.id, bo.user.id);
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_invalid_credentials() {
        let (store, _clock, _storage) = store_at("2026-10-15T10:00:00+00:00").await;
        let err = store.login("ghost@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidCredentials));
        assert_eq!(store.get_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_then_logout() {
        let (store, _clock, _storage) = store_at("2026-10-15T10:00:00+00:00").await;
        let registered = store.register("ana@example.com", "pw", "Ana").await.unwrap();
        store.logout().await.unwrap();
        assert_eq!(store.get_session().await.unwrap(), None);

        let session = store.login("ana@example.com", "anything").await.unwrap();
        assert_eq!(session.user, registered.user);
        assert_ne!(session.token, registered.token);
        assert_eq!(store.get_session().await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn test_get_daily_goal_default_is_not_persisted() {
        let (store, _clock, storage) = store_at("2026-10-15T10:00:00+00:00").await;
        let stranger = Uuid::new_v4();
        let goal = store.get_daily_goal(stranger).await.unwrap();
        assert_eq!(goal.goal_ml, 2000);
        assert_eq!(goal.user_id, stranger);
        assert!(raw_rows(&storage, GOALS_KEY).await.is_empty());
    }

    #[tokio::test]
    async fn test_update_daily_goal_upserts_single_row() {
        let (store, clock, storage) = store_at("2026-10-15T10:00:00+00:00").await;
        let user = store.register("ana@example.com", "pw", "Ana").await.unwrap().user;

        for goal_ml in [2500, 1800, 3000] {
            clock.advance(Duration::minutes(5));
            store.update_daily_goal(user.id, goal_ml).await.unwrap();
        }

        let rows = raw_rows(&storage, GOALS_KEY).await;
        assert_eq!(rows.len(), 1);
        let goal = store.get_daily_goal(user.id).await.unwrap();
        assert_eq!(goal.goal_ml, 3000);
        assert_eq!(goal.reminder_frequency, 120);
        assert_eq!(goal.updated_at, clock.now().with_timezone(&Utc));
    }

    #[tokio::test]
    async fn test_update_daily_goal_inserts_for_unknown_user() {
        let (store, _clock, storage) = store_at("2026-10-15T10:00:00+00:00").await;
        let user_id = Uuid::new_v4();
        store.update_daily_goal(user_id, 1500).await.unwrap();
        store.update_daily_goal(user_id, 1600).await.unwrap();
        assert_eq!(raw_rows(&storage, GOALS_KEY).await.len(), 1);
    }

    #[tokio::test]
    async fn test_zero_quantities_rejected() {
        let (store, _clock, _storage) = store_at("2026-10-15T10:00:00+00:00").await;
        let user_id = Uuid::new_v4();
        assert!(matches!(
            store.update_daily_goal(user_id, 0).await,
            Err(StoreError::InvalidQuantity { field: "goal_ml" })
        ));
        assert!(matches!(
            store.log_water(user_id, 0).await,
            Err(StoreError::InvalidQuantity { field: "amount_ml" })
        ));
    }

    #[tokio::test]
    async fn test_log_water_touches_last_logged_at_only() {
        let (store, clock, _storage) = store_at("2026-10-15T08:00:00+00:00").await;
        let user = store.register("ana@example.com", "pw", "Ana").await.unwrap().user;
        let before = store.get_behavior_stats(user.id).await.unwrap().unwrap();

        clock.advance(Duration::hours(2));
        let log = store.log_water(user.id, 250).await.unwrap();
        let after = store.get_behavior_stats(user.id).await.unwrap().unwrap();

        assert_eq!(after.last_logged_at, log.created_at);
        assert_ne!(after.last_logged_at, before.last_logged_at);
        assert_eq!(after.streak_days, before.streak_days);
        assert_eq!(after.average_daily_intake, before.average_daily_intake);
        assert_eq!(after.consistency_score, before.consistency_score);
    }

    #[tokio::test]
    async fn test_today_logs_sum() {
        let (store, _clock, _storage) = store_at("2026-10-15T12:00:00+00:00").await;
        let user = store.register("ana@example.com", "pw", "Ana").await.unwrap().user;
        store.log_water(user.id, 200).await.unwrap();
        store.log_water(user.id, 300).await.unwrap();

        let today = store.get_today_logs(user.id).await.unwrap();
        let total: u32 = today.iter().map(|l| l.amount_ml).sum();
        assert_eq!(total, 500);
    }

    #[tokio::test]
    async fn test_today_logs_use_local_calendar_date() {
        // 23:30 local on the 14th is 21:30Z; at 00:30 local on the 15th it is
        // yesterday even though it is only an hour old.
        let (store, clock, _storage) = store_at("2026-10-14T23:30:00+02:00").await;
        let user = store.register("ana@example.com", "pw", "Ana").await.unwrap().user;
        store.log_water(user.id, 400).await.unwrap();

        clock.advance(Duration::hours(1));
        store.log_water(user.id, 150).await.unwrap();

        let today = store.get_today_logs(user.id).await.unwrap();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].amount_ml, 150);
    }

    #[tokio::test]
    async fn test_water_logs_filtered_by_user() {
        let (store, _clock, _storage) = store_at("2026-10-15T12:00:00+00:00").await;
        let ana = store.register("ana@example.com", "pw", "Ana").await.unwrap().user;
        let bo = store.register("bo@example.com", "pw", "Bo").await.unwrap().user;
        store.log_water(ana.id, 200).await.unwrap();
        store.log_water(bo.id, 900).await.unwrap();

        let logs = store.get_water_logs(ana.id, TimeRange::Week).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].amount_ml, 200);
    }

    #[tokio::test]
    async fn test_month_range_excludes_31_days_includes_29() {
        let (store, clock, _storage) = store_at("2026-09-14T12:00:00+00:00").await;
        let user_id = Uuid::new_v4();
        store.log_water(user_id, 111).await.unwrap(); // 31 days before "now"
        clock.advance(Duration::days(2));
        store.log_water(user_id, 222).await.unwrap(); // 29 days before "now"
        clock.advance(Duration::days(29));

        let month = store.get_water_logs(user_id, TimeRange::Month).await.unwrap();
        let amounts: Vec<u32> = month.iter().map(|l| l.amount_ml).collect();
        assert_eq!(amounts, vec![222]);

        let week = store.get_water_logs(user_id, TimeRange::Week).await.unwrap();
        assert!(week.is_empty());
    }

    #[tokio::test]
    async fn test_range_lower_bound_is_inclusive() {
        let (store, clock, _storage) = store_at("2026-10-08T12:00:00+00:00").await;
        let user_id = Uuid::new_v4();
        store.log_water(user_id, 300).await.unwrap();
        clock.advance(Duration::days(7));
        let week = store.get_water_logs(user_id, TimeRange::Week).await.unwrap();
        assert_eq!(week.len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_collection_is_reported() {
        let (store, _clock, storage) = store_at("2026-10-15T12:00:00+00:00").await;
        storage.set(LOGS_KEY, "{not json").await.unwrap();
        let err = store
            .get_water_logs(Uuid::new_v4(), TimeRange::Week)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { key: LOGS_KEY, .. }));
    }
}
