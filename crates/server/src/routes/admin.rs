//! Platform-wide views for super admins.

use axum::extract::State;

use crate::db::StatsRepository;
use crate::error::Result;
use crate::extract::AppJson;
use crate::models::stats::GlobalStats;
use crate::state::AppState;

/// `GET /api/admin/stats`
pub async fn stats(State(state): State<AppState>) -> Result<AppJson<GlobalStats>> {
    let stats = StatsRepository::new(state.pool(), &state.config().timezone)
        .global()
        .await?;
    Ok(AppJson(stats))
}
