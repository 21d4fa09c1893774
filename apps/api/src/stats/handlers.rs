use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::stats::{compute_statistics, StatisticsReport};

#[derive(Deserialize)]
pub struct StatisticsQuery {
    pub user_id: Uuid,
}

/// GET /api/v1/statistics
pub async fn handle_statistics(
    State(state): State<AppState>,
    Query(params): Query<StatisticsQuery>,
) -> Result<Json<StatisticsReport>, AppError> {
    let report = compute_statistics(
        &state.db,
        params.user_id,
        state.clock.now(),
        state.config.stats_utc_offset_minutes,
        state.config.weekly_review_target,
    )
    .await?;

    Ok(Json(report))
}
