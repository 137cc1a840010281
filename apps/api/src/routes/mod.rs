pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::insights::handlers as insights;
use crate::state::AppState;
use crate::tracking::handlers as tracking;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth / session
        .route("/api/v1/auth/register", post(auth::handle_register))
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/logout", post(auth::handle_logout))
        .route("/api/v1/auth/session", get(auth::handle_get_session))
        // Tracking
        .route(
            "/api/v1/goal",
            get(tracking::handle_get_goal).put(tracking::handle_update_goal),
        )
        .route(
            "/api/v1/logs",
            get(tracking::handle_get_logs).post(tracking::handle_log_water),
        )
        .route("/api/v1/logs/today", get(tracking::handle_get_today_logs))
        .route("/api/v1/stats", get(tracking::handle_get_stats))
        .route("/api/v1/chart/weekly", get(tracking::handle_weekly_chart))
        .route("/api/v1/dashboard", get(tracking::handle_dashboard))
        // Insights
        .route("/api/v1/insights", get(insights::handle_get_insights))
        .route("/api/v1/quotes", get(insights::handle_get_quotes))
        .route(
            "/api/v1/settings/api-key",
            get(insights::handle_api_key_status).put(insights::handle_set_api_key),
        )
        .with_state(state)
}
