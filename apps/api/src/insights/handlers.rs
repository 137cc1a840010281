//! Axum route handlers for AI insights, quotes and the API credential.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::insights::SmartInsight;
use crate::models::TimeRange;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetApiKeyRequest {
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct ApiKeyStatus {
    pub configured: bool,
}

/// GET /api/v1/insights
///
/// `null` when no credential is configured or the user has no recent logs.
pub async fn handle_get_insights(
    State(state): State<AppState>,
) -> Result<Json<Option<SmartInsight>>, AppError> {
    let session = state.require_session().await?;
    let user_id = session.user.id;
    let logs = state.store.get_water_logs(user_id, TimeRange::Week).await?;
    let goal = state.store.get_daily_goal(user_id).await?;
    Ok(Json(state.insights.insights_for(&logs, goal.goal_ml).await))
}

/// GET /api/v1/quotes
///
/// Empty until a credential is configured.
pub async fn handle_get_quotes(State(state): State<AppState>) -> Json<Vec<String>> {
    if !state.insights.has_api_key().await {
        return Json(Vec::new());
    }
    Json(state.insights.get_motivational_quotes().await)
}

/// GET /api/v1/settings/api-key
pub async fn handle_api_key_status(State(state): State<AppState>) -> Json<ApiKeyStatus> {
    Json(ApiKeyStatus {
        configured: state.insights.has_api_key().await,
    })
}

/// PUT /api/v1/settings/api-key
pub async fn handle_set_api_key(
    State(state): State<AppState>,
    Json(req): Json<SetApiKeyRequest>,
) -> Result<StatusCode, AppError> {
    if req.api_key.trim().is_empty() {
        return Err(AppError::Validation("api_key cannot be empty".to_string()));
    }
    state.insights.set_api_key(&req.api_key).await?;
    Ok(StatusCode::NO_CONTENT)
}
