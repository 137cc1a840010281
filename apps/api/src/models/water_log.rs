use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const WEEK_DAYS: i64 = 7;
pub const MONTH_DAYS: i64 = 30;

/// A single intake event. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount_ml: u32,
    pub created_at: DateTime<Utc>,
}

/// Trailing window for log queries, anchored at "now".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    #[default]
    Week,
    Month,
}

impl TimeRange {
    pub fn days(self) -> i64 {
        match self {
            TimeRange::Week => WEEK_DAYS,
            TimeRange::Month => MONTH_DAYS,
        }
    }

    pub fn span(self) -> Duration {
        Duration::days(self.days())
    }
}
