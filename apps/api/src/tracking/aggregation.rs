//! Weekly chart preparation: seven calendar-day buckets ending today.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::WaterLog;

pub const CHART_DAYS: i64 = 7;

/// Total intake for one local calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBucket {
    /// Weekday abbreviation, "Sun" through "Sat".
    pub label: String,
    pub date: NaiveDate,
    pub amount_ml: u64,
}

impl DayBucket {
    /// Whether the day's total meets `goal_ml`. Drives bar highlighting.
    pub fn reached(&self, goal_ml: u32) -> bool {
        self.amount_ml >= u64::from(goal_ml)
    }
}

/// Calendar date of `ts` in the given local offset.
pub fn local_date(ts: DateTime<Utc>, offset: &FixedOffset) -> NaiveDate {
    ts.with_timezone(offset).date_naive()
}

pub fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sun",
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
    }
}

/// Buckets `logs` into the seven local calendar days from six days before
/// `now` through `now`, oldest first. Logs outside the window are ignored and
/// days with no logs sum to zero.
pub fn weekly_buckets(logs: &[WaterLog], now: DateTime<FixedOffset>) -> Vec<DayBucket> {
    let offset = *now.offset();
    let today = now.date_naive();

    (0..CHART_DAYS)
        .rev()
        .map(|days_ago| {
            let date = today - Duration::days(days_ago);
            let amount_ml = logs
                .iter()
                .filter(|l| local_date(l.created_at, &offset) == date)
                .map(|l| u64::from(l.amount_ml))
                .sum();
            DayBucket {
                label: weekday_label(date.weekday()).to_string(),
                date,
                amount_ml,
            }
        })
        .collect()
}
