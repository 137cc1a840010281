use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_CONSISTENCY_SCORE: u8 = 50;

/// Per-user behavior summary, created at registration.
///
/// Only `last_logged_at` is maintained today. `streak_days`,
/// `average_daily_intake` and `consistency_score` keep their registration
/// values until a recomputation pass exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBehaviorStats {
    pub user_id: Uuid,
    pub streak_days: u32,
    pub average_daily_intake: u32,
    pub last_logged_at: DateTime<Utc>,
    /// 0 – 100
    pub consistency_score: u8,
}

impl UserBehaviorStats {
    pub fn initial(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            streak_days: 0,
            average_daily_intake: 0,
            last_logged_at: now,
            consistency_score: DEFAULT_CONSISTENCY_SCORE,
        }
    }
}
