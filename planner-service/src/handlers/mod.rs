pub mod app;
pub mod metrics;
pub mod planner;
pub mod report;

use crate::models::{PlannerSession, SESSION_KEY};
use service_core::error::AppError;
use tower_sessions::Session;

/// Current planner state, or a fresh one for a new visitor.
pub async fn load_planner(session: &Session) -> Result<PlannerSession, AppError> {
    session
        .get::<PlannerSession>(SESSION_KEY)
        .await
        .map(Option::unwrap_or_default)
        .map_err(|e| AppError::SessionError(anyhow::anyhow!("failed to read session: {}", e)))
}

pub async fn save_planner(session: &Session, planner: &PlannerSession) -> Result<(), AppError> {
    session
        .insert(SESSION_KEY, planner)
        .await
        .map_err(|e| AppError::SessionError(anyhow::anyhow!("failed to write session: {}", e)))
}
