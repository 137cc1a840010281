//! Axum route handlers for goals, water logs, stats and the dashboard.
//! All of them act on the user of the active session.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{DailyGoal, TimeRange, UserBehaviorStats, WaterLog};
use crate::state::AppState;
use crate::tracking::aggregation::{weekly_buckets, DayBucket};
use crate::tracking::dashboard::{build_summary, DashboardSummary};

#[derive(Debug, Deserialize)]
pub struct UpdateGoalRequest {
    pub goal_ml: u32,
}

#[derive(Debug, Deserialize)]
pub struct LogWaterRequest {
    pub amount_ml: u32,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    #[serde(default)]
    pub range: TimeRange,
}

/// GET /api/v1/goal
pub async fn handle_get_goal(State(state): State<AppState>) -> Result<Json<DailyGoal>, AppError> {
    let session = state.require_session().await?;
    Ok(Json(state.store.get_daily_goal(session.user.id).await?))
}

/// PUT /api/v1/goal
pub async fn handle_update_goal(
    State(state): State<AppState>,
    Json(req): Json<UpdateGoalRequest>,
) -> Result<Json<DailyGoal>, AppError> {
    let session = state.require_session().await?;
    let goal = state
        .store
        .update_daily_goal(session.user.id, req.goal_ml)
        .await?;
    Ok(Json(goal))
}

/// POST /api/v1/logs
pub async fn handle_log_water(
    State(state): State<AppState>,
    Json(req): Json<LogWaterRequest>,
) -> Result<(StatusCode, Json<WaterLog>), AppError> {
    let session = state.require_session().await?;
    let log = state.store.log_water(session.user.id, req.amount_ml).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

/// GET /api/v1/logs?range=week|month
pub async fn handle_get_logs(
    State(state): State<AppState>,
    Query(params): Query<RangeQuery>,
) -> Result<Json<Vec<WaterLog>>, AppError> {
    let session = state.require_session().await?;
    let logs = state
        .store
        .get_water_logs(session.user.id, params.range)
        .await?;
    Ok(Json(logs))
}

/// GET /api/v1/logs/today
pub async fn handle_get_today_logs(
    State(state): State<AppState>,
) -> Result<Json<Vec<WaterLog>>, AppError> {
    let session = state.require_session().await?;
    Ok(Json(state.store.get_today_logs(session.user.id).await?))
}

/// GET /api/v1/stats
///
/// `null` for users registered without a stats row.
pub async fn handle_get_stats(
    State(state): State<AppState>,
) -> Result<Json<Option<UserBehaviorStats>>, AppError> {
    let session = state.require_session().await?;
    Ok(Json(state.store.get_behavior_stats(session.user.id).await?))
}

/// GET /api/v1/chart/weekly
pub async fn handle_weekly_chart(
    State(state): State<AppState>,
) -> Result<Json<Vec<DayBucket>>, AppError> {
    let session = state.require_session().await?;
    let logs = state
        .store
        .get_water_logs(session.user.id, TimeRange::Week)
        .await?;
    Ok(Json(weekly_buckets(&logs, state.store.clock().now())))
}

/// GET /api/v1/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardSummary>, AppError> {
    let session = state.require_session().await?;
    Ok(Json(build_summary(&state.store, session.user).await?))
}
