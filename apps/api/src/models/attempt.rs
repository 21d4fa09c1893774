use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::card::CardStatus;

/// One graded self-explanation event. Append-only: rows are inserted by the
/// evaluation commit and never mutated or deleted by the core.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttemptRow {
    pub id: Uuid,
    pub card_id: Uuid,
    /// Denormalized from the card for query convenience.
    pub note_id: Uuid,
    pub selected_role: String,
    pub explanation: String,
    /// 0–100 inclusive.
    pub score: i32,
    /// Raw grader feedback payload, opaque to the core.
    pub feedback: Value,
    /// The status the card transitioned to as a result of this attempt.
    pub status: CardStatus,
    /// 1-based, per card. Equals the card's review_count after the commit.
    pub attempt_number: i32,
    pub attempted_at: DateTime<Utc>,
}
