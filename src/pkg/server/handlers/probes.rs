use axum::extract::State;
use sqlx::query;

use crate::{conf::settings, pkg::server::state::AppState, prelude::Result};

pub async fn livez() -> Result<()> {
    tracing::debug!("{} is live", settings.service_name);
    Ok(())
}

/// Healthy means the job post store answers.
pub async fn healthz(State(state): State<AppState>) -> Result<()> {
    query("select 1").execute(&*state.db_pool).await?;
    tracing::debug!("{} is healthy", settings.service_name);
    Ok(())
}
