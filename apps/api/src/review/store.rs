//! Transactional writes for the review flow.
//!
//! The attempt insert and the card update commit together or not at all.
//! Atomicity within a single card is delegated to the store: the card
//! update is guarded by the `review_count` the caller read, so a concurrent
//! commit on the same card makes exactly one of the writers lose with a
//! retryable conflict instead of two attempts claiming the same number.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::attempt::AttemptRow;
use crate::models::card::{CardRow, CardStatus};

/// Parameters for committing one graded attempt against a card snapshot.
pub struct CommitAttemptParams<'a> {
    /// The card as read at the start of the evaluation. Its `review_count`
    /// is the optimistic-concurrency guard.
    pub card: &'a CardRow,
    pub selected_role: &'a str,
    pub explanation: &'a str,
    pub score: i32,
    pub feedback: &'a Value,
    pub new_status: CardStatus,
    pub now: DateTime<Utc>,
    pub clear_mastered_on_regress: bool,
}

/// Inserts the attempt and applies the card transition in one transaction.
///
/// `attempt_number` is `review_count + 1` from the snapshot; if another
/// writer committed in between, the guarded UPDATE matches zero rows and
/// the whole transaction rolls back with `AppError::Conflict`.
pub async fn commit_attempt(
    pool: &PgPool,
    params: CommitAttemptParams<'_>,
) -> Result<AttemptRow, AppError> {
    let CommitAttemptParams {
        card,
        selected_role,
        explanation,
        score,
        feedback,
        new_status,
        now,
        clear_mastered_on_regress,
    } = params;

    let attempt_number = card.review_count + 1;
    let mastered_at = next_mastered_at(card, new_status, now, clear_mastered_on_regress);

    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        r#"
        UPDATE flash_cards
        SET status = $1, review_count = $2, last_reviewed_at = $3, mastered_at = $4
        WHERE id = $5 AND review_count = $6
        "#,
    )
    .bind(new_status)
    .bind(attempt_number)
    .bind(now)
    .bind(mastered_at)
    .bind(card.id)
    .bind(card.review_count)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(AppError::Conflict(card.id));
    }

    let attempt_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO learning_attempts
            (id, card_id, note_id, selected_role, explanation, score,
             feedback, status, attempt_number, attempted_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(attempt_id)
    .bind(card.id)
    .bind(card.note_id)
    .bind(selected_role)
    .bind(explanation)
    .bind(score)
    .bind(feedback)
    .bind(new_status)
    .bind(attempt_number)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        "Committed attempt {} for card {} (attempt #{}, score {}, -> {})",
        attempt_id,
        card.id,
        attempt_number,
        score,
        new_status.as_str()
    );

    Ok(AttemptRow {
        id: attempt_id,
        card_id: card.id,
        note_id: card.note_id,
        selected_role: selected_role.to_string(),
        explanation: explanation.to_string(),
        score,
        feedback: feedback.clone(),
        status: new_status,
        attempt_number,
        attempted_at: now,
    })
}

/// Applies a manual status override with the same timestamp rules as a
/// graded transition, without creating an attempt or bumping review_count
/// (review_count mirrors the attempt log, and there is no attempt here).
pub async fn apply_status_override(
    pool: &PgPool,
    card: &CardRow,
    new_status: CardStatus,
    now: DateTime<Utc>,
    clear_mastered_on_regress: bool,
) -> Result<CardRow, AppError> {
    let mastered_at = next_mastered_at(card, new_status, now, clear_mastered_on_regress);

    let updated = sqlx::query_as::<_, CardRow>(
        r#"
        UPDATE flash_cards
        SET status = $1, last_reviewed_at = $2, mastered_at = $3
        WHERE id = $4 AND review_count = $5
        RETURNING *
        "#,
    )
    .bind(new_status)
    .bind(now)
    .bind(mastered_at)
    .bind(card.id)
    .bind(card.review_count)
    .fetch_optional(pool)
    .await?;

    updated.ok_or(AppError::Conflict(card.id))
}

/// mastered_at is set the instant a card enters MASTERED and only if it was
/// previously unset. On regression out of MASTERED the historical value is
/// kept unless the deployment opted into clearing it.
fn next_mastered_at(
    card: &CardRow,
    new_status: CardStatus,
    now: DateTime<Utc>,
    clear_on_regress: bool,
) -> Option<DateTime<Utc>> {
    if new_status == CardStatus::Mastered {
        Some(card.mastered_at.unwrap_or(now))
    } else if clear_on_regress && card.status == CardStatus::Mastered {
        None
    } else {
        card.mastered_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn card(status: CardStatus, mastered_at: Option<DateTime<Utc>>) -> CardRow {
        CardRow {
            id: Uuid::from_u128(1),
            note_id: Uuid::from_u128(2),
            term: "osmosis".to_string(),
            status,
            review_count: 3,
            last_reviewed_at: None,
            mastered_at,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn ts(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_mastered_at_set_on_first_mastery() {
        let c = card(CardStatus::NeedsReview, None);
        assert_eq!(
            next_mastered_at(&c, CardStatus::Mastered, ts(5), false),
            Some(ts(5))
        );
    }

    #[test]
    fn test_mastered_at_not_overwritten_on_repeat_mastery() {
        let c = card(CardStatus::Mastered, Some(ts(1)));
        assert_eq!(
            next_mastered_at(&c, CardStatus::Mastered, ts(5), false),
            Some(ts(1))
        );
    }

    #[test]
    fn test_mastered_at_kept_on_regression_by_default() {
        let c = card(CardStatus::Mastered, Some(ts(1)));
        assert_eq!(
            next_mastered_at(&c, CardStatus::NotMastered, ts(5), false),
            Some(ts(1))
        );
    }

    #[test]
    fn test_mastered_at_cleared_on_regression_when_configured() {
        let c = card(CardStatus::Mastered, Some(ts(1)));
        assert_eq!(next_mastered_at(&c, CardStatus::NeedsImprove, ts(5), true), None);
    }

    #[test]
    fn test_mastered_at_untouched_between_low_tiers() {
        let c = card(CardStatus::NeedsImprove, None);
        assert_eq!(next_mastered_at(&c, CardStatus::NeedsReview, ts(5), true), None);
    }
}
