//! Axum route handlers for registration, login and the client session.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::Session;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<Session>, AppError> {
    let session = state
        .store
        .register(&req.email, &req.password, &req.name)
        .await?;
    Ok(Json(session))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Session>, AppError> {
    let session = state.store.login(&req.email, &req.password).await?;
    Ok(Json(session))
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.store.logout().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/session
///
/// `null` when nobody is logged in.
pub async fn handle_get_session(
    State(state): State<AppState>,
) -> Result<Json<Option<Session>>, AppError> {
    Ok(Json(state.store.get_session().await?))
}
