use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Mastery state of a card. Single closed enum at the core boundary;
/// the storage edge maps it to the `card_status` Postgres enum in
/// snake_case regardless of what casing older data layers used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "card_status", rename_all = "snake_case")]
pub enum CardStatus {
    /// Initial value only. Never re-entered once an attempt exists.
    NotStarted,
    NotMastered,
    NeedsImprove,
    /// Nearly mastered, needs consolidation.
    NeedsReview,
    Mastered,
}

impl CardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardStatus::NotStarted => "not_started",
            CardStatus::NotMastered => "not_mastered",
            CardStatus::NeedsImprove => "needs_improve",
            CardStatus::NeedsReview => "needs_review",
            CardStatus::Mastered => "mastered",
        }
    }
}

/// Card counts per status over some scope (one note, or all of a user's
/// notes). Zero-filled: absent statuses count as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounters {
    pub total: i64,
    pub not_started: i64,
    pub not_mastered: i64,
    pub needs_improve: i64,
    pub needs_review: i64,
    pub mastered: i64,
}

impl StatusCounters {
    pub fn from_counts(counts: &[(CardStatus, i64)]) -> Self {
        let mut counters = StatusCounters::default();
        for (status, count) in counts {
            match status {
                CardStatus::NotStarted => counters.not_started = *count,
                CardStatus::NotMastered => counters.not_mastered = *count,
                CardStatus::NeedsImprove => counters.needs_improve = *count,
                CardStatus::NeedsReview => counters.needs_review = *count,
                CardStatus::Mastered => counters.mastered = *count,
            }
            counters.total += count;
        }
        counters
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CardRow {
    pub id: Uuid,
    pub note_id: Uuid,
    pub term: String,
    pub status: CardStatus,
    pub review_count: i32,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub mastered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
