use crate::config::Config;
use crate::errors::AppError;
use crate::insights::InsightService;
use crate::models::Session;
use crate::store::LocalStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: LocalStore,
    pub insights: InsightService,
    pub config: Config,
}

impl AppState {
    /// The active session, or `Unauthorized` when nobody is logged in or the
    /// session points at a user that no longer exists.
    pub async fn require_session(&self) -> Result<Session, AppError> {
        let session = self
            .store
            .get_session()
            .await?
            .ok_or(AppError::Unauthorized)?;
        if self.store.get_user(session.user.id).await?.is_none() {
            tracing::warn!("Session references unknown user {}", session.user.id);
            return Err(AppError::Unauthorized);
        }
        Ok(session)
    }
}
