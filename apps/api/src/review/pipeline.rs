//! Evaluation pipeline: explanation in, graded attempt out.
//!
//! Orchestrates card lookup → external grading → state machine → atomic
//! commit. The grading call is the only step allowed to fail softly: a
//! grader outage degrades to a deterministic fallback verdict instead of
//! failing the learner's submission.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::cards::store::{get_card, get_note};
use crate::errors::AppError;
use crate::grader::{GradeReport, Grader};
use crate::models::card::{CardRow, CardStatus};
use crate::review::state_machine::transition;
use crate::review::store::{apply_status_override, commit_attempt, CommitAttemptParams};

/// When a request carries no persona, fall back to the note's stored hint,
/// then to this.
const DEFAULT_ROLE: &str = "college";

#[derive(Debug, Serialize)]
pub struct EvaluationResult {
    pub attempt_id: Uuid,
    pub card_id: Uuid,
    pub score: i32,
    pub status: CardStatus,
    pub attempt_number: i32,
    pub feedback: String,
    pub highlights: Vec<String>,
    pub suggestions: Vec<String>,
}

pub struct EvaluateRequest<'a> {
    pub card_id: Uuid,
    pub note_id: Uuid,
    pub role: Option<&'a str>,
    pub explanation: &'a str,
}

/// Grades one self-explanation and records the resulting transition.
///
/// The attempt insert and card update commit in a single transaction; a
/// concurrent submission for the same card surfaces as a retryable
/// conflict rather than two attempts sharing an attempt_number.
pub async fn evaluate(
    db: &PgPool,
    grader: &dyn Grader,
    request: EvaluateRequest<'_>,
    now: DateTime<Utc>,
    clear_mastered_on_regress: bool,
) -> Result<EvaluationResult, AppError> {
    if request.explanation.trim().is_empty() {
        return Err(AppError::Validation("Explanation must not be empty".to_string()));
    }

    let card = get_card(db, request.card_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Card {} not found", request.card_id)))?;
    if card.note_id != request.note_id {
        return Err(AppError::Validation(format!(
            "Card {} does not belong to note {}",
            request.card_id, request.note_id
        )));
    }

    let role = match request.role {
        Some(role) if !role.trim().is_empty() => role.trim().to_string(),
        _ => {
            let note = get_note(db, card.note_id).await?;
            note.and_then(|n| n.default_role)
                .unwrap_or_else(|| DEFAULT_ROLE.to_string())
        }
    };

    let (report, fallback) = match grader.grade(&card.term, request.explanation, &role).await {
        Ok(report) => (report, false),
        Err(e) => {
            // Degrade, never fail the submission. The warn plus the
            // `fallback` marker in the stored payload keep a synthetic
            // score 60 distinguishable from a genuine one.
            warn!(
                "Grading unavailable for card {} (term '{}'): {e}; using fallback verdict",
                card.id, card.term
            );
            (GradeReport::fallback(), true)
        }
    };

    // Defensive re-validation; the grader clamps, but the state machine is
    // the final authority on what a score may be.
    let (new_status, _interval) =
        transition(report.score).map_err(|e| AppError::InvalidScore(e.0))?;

    let mut feedback_payload =
        serde_json::to_value(&report).map_err(|e| AppError::Internal(e.into()))?;
    if fallback {
        feedback_payload["fallback"] = json!(true);
    }

    let attempt = commit_attempt(
        db,
        CommitAttemptParams {
            card: &card,
            selected_role: &role,
            explanation: request.explanation,
            score: report.score,
            feedback: &feedback_payload,
            new_status,
            now,
            clear_mastered_on_regress,
        },
    )
    .await?;

    Ok(EvaluationResult {
        attempt_id: attempt.id,
        card_id: card.id,
        score: report.score,
        status: new_status,
        attempt_number: attempt.attempt_number,
        feedback: report.feedback,
        highlights: report.highlights,
        suggestions: report.suggestions,
    })
}

/// Manual status override ("mark as mastered") bypassing grading. Applies
/// the same last_reviewed_at / mastered_at rules as a graded transition.
pub async fn set_card_status(
    db: &PgPool,
    card_id: Uuid,
    new_status: CardStatus,
    now: DateTime<Utc>,
    clear_mastered_on_regress: bool,
) -> Result<CardRow, AppError> {
    if new_status == CardStatus::NotStarted {
        // Initial value only; it is never re-entered.
        return Err(AppError::Validation(
            "A card cannot be reset to not_started".to_string(),
        ));
    }

    let card = get_card(db, card_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Card {card_id} not found")))?;

    apply_status_override(db, &card, new_status, now, clear_mastered_on_regress).await
}
