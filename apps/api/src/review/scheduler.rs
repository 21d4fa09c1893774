//! Due-queue projection.
//!
//! Read-only: answers "which cards should the learner study next" from the
//! current card set plus `now`. Never mutates persisted state. Computed in
//! process over fetched rows so the ordering contract is testable without
//! a database.

use chrono::{DateTime, Utc};

use crate::models::card::{CardRow, CardStatus};
use crate::review::state_machine::review_interval;

/// True iff the card has never been reviewed, or its status interval has
/// fully elapsed since the last review. The boundary instant counts as due.
pub fn is_due(card: &CardRow, now: DateTime<Utc>) -> bool {
    match card.last_reviewed_at {
        None => true,
        Some(last) => last + review_interval(card.status) <= now,
    }
}

/// Sort tier for the due queue: weakest cards first. Never-started cards
/// share the weakest tier with not-mastered ones (the interval table pairs
/// them); the nulls-first tiebreak then puts them ahead within the tier.
fn priority(status: CardStatus) -> u8 {
    match status {
        CardStatus::NotStarted | CardStatus::NotMastered => 0,
        CardStatus::NeedsImprove => 1,
        CardStatus::NeedsReview => 2,
        CardStatus::Mastered => 3,
    }
}

/// Filters the card set down to due cards and orders them deterministically:
/// priority tier, then last_reviewed_at ascending with nulls first, then id.
pub fn due_cards(cards: Vec<CardRow>, now: DateTime<Utc>) -> Vec<CardRow> {
    let mut due: Vec<CardRow> = cards.into_iter().filter(|c| is_due(c, now)).collect();
    due.sort_by_key(|c| (priority(c.status), c.last_reviewed_at, c.id));
    due
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn card(
        id: u128,
        status: CardStatus,
        last_reviewed_at: Option<DateTime<Utc>>,
    ) -> CardRow {
        CardRow {
            id: Uuid::from_u128(id),
            note_id: Uuid::from_u128(1),
            term: format!("term-{id}"),
            status,
            review_count: if last_reviewed_at.is_some() { 1 } else { 0 },
            last_reviewed_at,
            mastered_at: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, h, 0, 0).unwrap()
    }

    #[test]
    fn test_fresh_card_is_always_due() {
        let c = card(1, CardStatus::NotStarted, None);
        assert!(is_due(&c, at(0)));
        assert!(is_due(&c, Utc.with_ymd_and_hms(1999, 1, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_due_exactly_at_interval_boundary() {
        // NotMastered → 4h interval. Reviewed at 08:00, due at exactly 12:00.
        let c = card(1, CardStatus::NotMastered, Some(at(8)));
        assert!(!is_due(&c, at(11)));
        assert!(is_due(&c, at(12)));
        assert!(is_due(&c, at(13)));
    }

    #[test]
    fn test_mastered_due_after_seven_days() {
        let reviewed = at(8);
        let c = card(1, CardStatus::Mastered, Some(reviewed));
        assert!(!is_due(&c, reviewed + Duration::days(6)));
        assert!(is_due(&c, reviewed + Duration::days(7)));
    }

    #[test]
    fn test_ordering_weakest_first_then_oldest_then_id() {
        let old = at(0) - Duration::days(30);
        let older = at(0) - Duration::days(40);
        let cards = vec![
            card(5, CardStatus::Mastered, Some(older)),
            card(4, CardStatus::NeedsReview, Some(old)),
            card(3, CardStatus::NeedsImprove, Some(old)),
            card(2, CardStatus::NotMastered, Some(old)),
            card(1, CardStatus::NotStarted, None),
        ];
        let due = due_cards(cards, at(0));
        let ids: Vec<u128> = due.iter().map(|c| c.id.as_u128()).collect();
        // NotStarted (null last_reviewed_at) leads the weakest tier.
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_ordering_within_tier_by_last_reviewed_then_id() {
        let cards = vec![
            card(3, CardStatus::NotMastered, Some(at(0) - Duration::days(1))),
            card(2, CardStatus::NotMastered, Some(at(0) - Duration::days(2))),
            card(9, CardStatus::NotMastered, Some(at(0) - Duration::days(2))),
        ];
        let due = due_cards(cards, at(0));
        let ids: Vec<u128> = due.iter().map(|c| c.id.as_u128()).collect();
        assert_eq!(ids, vec![2, 9, 3]);
    }

    #[test]
    fn test_not_yet_due_cards_are_filtered_out() {
        let cards = vec![
            card(1, CardStatus::Mastered, Some(at(0) - Duration::days(1))),
            card(2, CardStatus::NotMastered, Some(at(0) - Duration::hours(5))),
        ];
        let due = due_cards(cards, at(0));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id.as_u128(), 2);
    }

    #[test]
    fn test_ordering_is_reproducible() {
        let mk = || {
            vec![
                card(7, CardStatus::NeedsReview, Some(at(0) - Duration::days(2))),
                card(1, CardStatus::NotMastered, Some(at(0) - Duration::days(1))),
                card(4, CardStatus::NotStarted, None),
            ]
        };
        let a = due_cards(mk(), at(0));
        let b = due_cards(mk(), at(0));
        let ids = |v: &[CardRow]| v.iter().map(|c| c.id).collect::<Vec<_>>();
        assert_eq!(ids(&a), ids(&b));
    }
}
