//! Learning-statistics aggregator.
//!
//! Read-only projections over the card set and the append-only attempt
//! log: status counters, due count, study streak, 7-day trend, weekly
//! completion. Always consistent with what the store currently holds —
//! no caching layer. Store failures surface as-is: a dashboard showing an
//! error beats a dashboard showing wrong numbers.

pub mod handlers;
pub mod timeline;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::cards::store::{count_by_status_for_owner, list_for_owner};
use crate::errors::AppError;
use crate::models::card::StatusCounters;
use crate::review::scheduler::due_cards;
use crate::stats::timeline::{DayCount, Timeline};

/// Covers the 30-day streak window plus slack for the reference offset.
const ATTEMPT_LOOKBACK_DAYS: i64 = 32;

#[derive(Debug, Serialize)]
pub struct StatisticsReport {
    pub status_counters: StatusCounters,
    pub due_count: usize,
    pub streak_days: i64,
    pub trend_7d: Vec<DayCount>,
    pub active_days_7d: i64,
    pub week_completed: i64,
    pub week_target: i64,
}

pub async fn compute_statistics(
    db: &PgPool,
    user_id: Uuid,
    now: DateTime<Utc>,
    utc_offset_minutes: i32,
    week_target: i64,
) -> Result<StatisticsReport, AppError> {
    let tl = Timeline::new(utc_offset_minutes);

    let counts = count_by_status_for_owner(db, user_id).await?;
    let status_counters = StatusCounters::from_counts(&counts);

    let cards = list_for_owner(db, user_id).await?;
    let due_count = due_cards(cards, now).len();

    let attempts =
        recent_attempt_times(db, user_id, now - Duration::days(ATTEMPT_LOOKBACK_DAYS)).await?;

    let trend_7d = tl.trend_7d(&attempts, now);
    let active_days_7d = Timeline::active_days(&trend_7d);

    Ok(StatisticsReport {
        status_counters,
        due_count,
        streak_days: tl.streak_days(&attempts, now),
        active_days_7d,
        week_completed: tl.weekly_completed(&attempts, now),
        week_target,
        trend_7d,
    })
}

/// Attempt timestamps for the owner's notes since `since`, oldest first.
async fn recent_attempt_times(
    db: &PgPool,
    user_id: Uuid,
    since: DateTime<Utc>,
) -> Result<Vec<DateTime<Utc>>, AppError> {
    Ok(sqlx::query_scalar(
        r#"
        SELECT la.attempted_at
        FROM learning_attempts la
        JOIN notes n ON n.id = la.note_id
        WHERE n.user_id = $1 AND la.attempted_at >= $2
        ORDER BY la.attempted_at ASC
        "#,
    )
    .bind(user_id)
    .bind(since)
    .fetch_all(db)
    .await?)
}
