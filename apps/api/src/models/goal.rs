use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_GOAL_ML: u32 = 2000;
/// Minutes between reminders. Every goal write resets to this value.
pub const DEFAULT_REMINDER_FREQUENCY_MIN: u32 = 120;

/// One row per user, upserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyGoal {
    pub user_id: Uuid,
    pub goal_ml: u32,
    pub reminder_frequency: u32,
    pub updated_at: DateTime<Utc>,
}

impl DailyGoal {
    pub fn new(user_id: Uuid, goal_ml: u32, updated_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            goal_ml,
            reminder_frequency: DEFAULT_REMINDER_FREQUENCY_MIN,
            updated_at,
        }
    }

    pub fn default_for(user_id: Uuid, updated_at: DateTime<Utc>) -> Self {
        Self::new(user_id, DEFAULT_GOAL_ML, updated_at)
    }
}
