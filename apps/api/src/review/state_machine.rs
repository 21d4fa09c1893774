//! Card mastery state machine.
//!
//! Pure score → status and status → interval tables. The next interval
//! depends only on the resulting status of the current attempt, never on
//! the prior status or the attempt count. Flat on purpose: this is a
//! fixed-interval scheme, not adaptive spaced repetition.

use chrono::Duration;
use thiserror::Error;

use crate::models::card::CardStatus;

/// A score outside 0–100 reached the state machine. The grader clamps its
/// own output, so seeing this means a caller bypassed the grading path.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("score {0} is outside the 0-100 range")]
pub struct InvalidScore(pub i32);

/// Maps a grading score to the resulting card status.
/// Closed, inclusive ranges; boundary values belong to the upper tier
/// (exactly 90 is mastered, exactly 70 is needs_review).
pub fn score_status(score: i32) -> Result<CardStatus, InvalidScore> {
    match score {
        90..=100 => Ok(CardStatus::Mastered),
        70..=89 => Ok(CardStatus::NeedsReview),
        50..=69 => Ok(CardStatus::NeedsImprove),
        0..=49 => Ok(CardStatus::NotMastered),
        _ => Err(InvalidScore(score)),
    }
}

/// Interval until a card in the given status is due again, measured from
/// the moment of the transition.
pub fn review_interval(status: CardStatus) -> Duration {
    match status {
        CardStatus::NotStarted | CardStatus::NotMastered => Duration::hours(4),
        CardStatus::NeedsImprove => Duration::days(3),
        CardStatus::NeedsReview => Duration::days(1),
        CardStatus::Mastered => Duration::days(7),
    }
}

/// `transition(score)` → (new status, interval until next due).
pub fn transition(score: i32) -> Result<(CardStatus, Duration), InvalidScore> {
    let status = score_status(score)?;
    Ok((status, review_interval(status)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_boundaries() {
        assert_eq!(score_status(0).unwrap(), CardStatus::NotMastered);
        assert_eq!(score_status(49).unwrap(), CardStatus::NotMastered);
        assert_eq!(score_status(50).unwrap(), CardStatus::NeedsImprove);
        assert_eq!(score_status(69).unwrap(), CardStatus::NeedsImprove);
        assert_eq!(score_status(70).unwrap(), CardStatus::NeedsReview);
        assert_eq!(score_status(89).unwrap(), CardStatus::NeedsReview);
        assert_eq!(score_status(90).unwrap(), CardStatus::Mastered);
        assert_eq!(score_status(100).unwrap(), CardStatus::Mastered);
    }

    #[test]
    fn test_out_of_range_scores_rejected() {
        assert_eq!(score_status(-1), Err(InvalidScore(-1)));
        assert_eq!(score_status(101), Err(InvalidScore(101)));
        assert_eq!(score_status(1000), Err(InvalidScore(1000)));
    }

    #[test]
    fn test_interval_table() {
        assert_eq!(
            review_interval(CardStatus::NotStarted),
            Duration::hours(4)
        );
        assert_eq!(
            review_interval(CardStatus::NotMastered),
            Duration::hours(4)
        );
        assert_eq!(review_interval(CardStatus::NeedsImprove), Duration::days(3));
        assert_eq!(review_interval(CardStatus::NeedsReview), Duration::days(1));
        assert_eq!(review_interval(CardStatus::Mastered), Duration::days(7));
    }

    #[test]
    fn test_transition_pairs_status_and_interval() {
        let (status, interval) = transition(95).unwrap();
        assert_eq!(status, CardStatus::Mastered);
        assert_eq!(interval, Duration::days(7));

        let (status, interval) = transition(45).unwrap();
        assert_eq!(status, CardStatus::NotMastered);
        assert_eq!(interval, Duration::hours(4));
    }
}
