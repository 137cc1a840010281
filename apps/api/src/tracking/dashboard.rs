use serde::Serialize;

use crate::models::{DailyGoal, TimeRange, User, WaterLog};
use crate::store::{LocalStore, StoreError};
use crate::tracking::aggregation::{weekly_buckets, DayBucket};

/// One-tap amounts offered by the client, in millilitres.
pub const QUICK_ADD_AMOUNTS: [u32; 3] = [200, 300, 500];

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub user: User,
    pub goal: DailyGoal,
    pub today_total_ml: u64,
    /// 0 – 100
    pub percentage: u8,
    pub today_logs: Vec<WaterLog>,
    pub weekly: Vec<DayBucket>,
    /// Days in `weekly` whose total met the current goal.
    pub days_goal_met: usize,
    pub streak_days: u32,
    pub quick_add_ml: [u32; 3],
}

pub fn today_total(logs: &[WaterLog]) -> u64 {
    logs.iter().map(|l| u64::from(l.amount_ml)).sum()
}

/// `min(round(total / goal * 100), 100)`. A zero goal reads as complete.
pub fn progress_percentage(total_ml: u64, goal_ml: u32) -> u8 {
    if goal_ml == 0 {
        return 100;
    }
    let pct = (total_ml as f64 / f64::from(goal_ml) * 100.0).round();
    pct.min(100.0) as u8
}

/// Everything the dashboard view renders for `user`.
pub async fn build_summary(store: &LocalStore, user: User) -> Result<DashboardSummary, StoreError> {
    let goal = store.get_daily_goal(user.id).await?;
    let week = store.get_water_logs(user.id, TimeRange::Week).await?;
    let today_logs = store.get_today_logs(user.id).await?;
    let streak_days = store
        .get_behavior_stats(user.id)
        .await?
        .map(|s| s.streak_days)
        .unwrap_or(0);

    let today_total_ml = today_total(&today_logs);
    let percentage = progress_percentage(today_total_ml, goal.goal_ml);
    let weekly = weekly_buckets(&week, store.clock().now());
    let days_goal_met = weekly.iter().filter(|b| b.reached(goal.goal_ml)).count();

    Ok(DashboardSummary {
        user,
        goal,
        today_total_ml,
        percentage,
        today_logs,
        weekly,
        days_goal_met,
        streak_days,
        quick_add_ml: QUICK_ADD_AMOUNTS,
    })
}
