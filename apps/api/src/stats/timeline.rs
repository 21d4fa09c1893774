//! Calendar arithmetic for the learning dashboard.
//!
//! Every computation runs in a configured fixed UTC offset — the reference
//! timezone is deployment config, never the host's local time. All
//! functions tolerate an empty attempt history and return zeros.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc};
use serde::Serialize;

/// Attempt count for one local calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: i64,
}

/// Streaks older than this are not interesting; bounding the walk also
/// bounds the attempt fetch feeding it.
const STREAK_LOOKBACK_DAYS: i64 = 30;

pub struct Timeline {
    offset: FixedOffset,
}

impl Timeline {
    pub fn new(utc_offset_minutes: i32) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_minutes * 60)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"));
        Self { offset }
    }

    fn local_date(&self, ts: DateTime<Utc>) -> NaiveDate {
        ts.with_timezone(&self.offset).date_naive()
    }

    /// Consecutive study days ending today or yesterday. A learner whose
    /// most recent attempt is two or more calendar days old has streak 0,
    /// regardless of older history.
    pub fn streak_days(&self, attempts: &[DateTime<Utc>], now: DateTime<Utc>) -> i64 {
        let today = self.local_date(now);
        let cutoff = today - Duration::days(STREAK_LOOKBACK_DAYS);

        let days: HashSet<NaiveDate> = attempts
            .iter()
            .map(|t| self.local_date(*t))
            .filter(|d| *d >= cutoff && *d <= today)
            .collect();

        let latest = match days.iter().max() {
            Some(d) => *d,
            None => return 0,
        };
        if (today - latest).num_days() > 1 {
            return 0;
        }

        let mut streak = 1;
        while days.contains(&(latest - Duration::days(streak))) {
            streak += 1;
        }
        streak
    }

    /// Attempt counts for the last 7 local calendar days including today,
    /// zero-filled, ordered oldest to newest.
    pub fn trend_7d(&self, attempts: &[DateTime<Utc>], now: DateTime<Utc>) -> Vec<DayCount> {
        let today = self.local_date(now);
        (0..7)
            .rev()
            .map(|back| {
                let date = today - Duration::days(back);
                let count = attempts
                    .iter()
                    .filter(|t| self.local_date(**t) == date)
                    .count() as i64;
                DayCount { date, count }
            })
            .collect()
    }

    pub fn active_days(trend: &[DayCount]) -> i64 {
        trend.iter().filter(|d| d.count > 0).count() as i64
    }

    /// The local date of the most recent Monday (today if today is Monday).
    pub fn week_start(&self, now: DateTime<Utc>) -> NaiveDate {
        let today = self.local_date(now);
        today - Duration::days(today.weekday().num_days_from_monday() as i64)
    }

    /// Attempts since the most recent Monday 00:00 local.
    pub fn weekly_completed(&self, attempts: &[DateTime<Utc>], now: DateTime<Utc>) -> i64 {
        let monday = self.week_start(now);
        attempts
            .iter()
            .filter(|t| self.local_date(**t) >= monday)
            .count() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    // 2026-03-11 is a Wednesday.
    fn now() -> DateTime<Utc> {
        utc(2026, 3, 11, 15)
    }

    #[test]
    fn test_streak_empty_history_is_zero() {
        let tl = Timeline::new(0);
        assert_eq!(tl.streak_days(&[], now()), 0);
    }

    #[test]
    fn test_streak_counts_today_and_yesterday_but_stops_at_gap() {
        let tl = Timeline::new(0);
        // Attempts today, yesterday, and 3 days ago: the gap at -2 ends the
        // streak at 2.
        let attempts = vec![utc(2026, 3, 11, 9), utc(2026, 3, 10, 20), utc(2026, 3, 8, 12)];
        assert_eq!(tl.streak_days(&attempts, now()), 2);
    }

    #[test]
    fn test_streak_zero_when_last_study_two_days_ago() {
        let tl = Timeline::new(0);
        let attempts = vec![utc(2026, 3, 9, 9), utc(2026, 3, 8, 9), utc(2026, 3, 7, 9)];
        assert_eq!(tl.streak_days(&attempts, now()), 0);
    }

    #[test]
    fn test_streak_anchored_at_yesterday_still_counts() {
        let tl = Timeline::new(0);
        let attempts = vec![utc(2026, 3, 10, 9), utc(2026, 3, 9, 9)];
        assert_eq!(tl.streak_days(&attempts, now()), 2);
    }

    #[test]
    fn test_streak_multiple_attempts_per_day_count_once() {
        let tl = Timeline::new(0);
        let attempts = vec![utc(2026, 3, 11, 9), utc(2026, 3, 11, 10), utc(2026, 3, 11, 11)];
        assert_eq!(tl.streak_days(&attempts, now()), 1);
    }

    #[test]
    fn test_streak_respects_reference_offset() {
        // 23:30 UTC on the 10th is already the 11th at UTC+2, so with that
        // offset the learner studied "today" and "yesterday".
        let tl = Timeline::new(120);
        let attempts = vec![
            Utc.with_ymd_and_hms(2026, 3, 10, 23, 30, 0).unwrap(),
            utc(2026, 3, 10, 12),
        ];
        assert_eq!(tl.streak_days(&attempts, now()), 2);

        // At UTC both land on the 10th: one studied day, anchored yesterday.
        let tl_utc = Timeline::new(0);
        assert_eq!(tl_utc.streak_days(&attempts, now()), 1);
    }

    #[test]
    fn test_trend_empty_history_is_seven_zeros() {
        let tl = Timeline::new(0);
        let trend = tl.trend_7d(&[], now());
        assert_eq!(trend.len(), 7);
        assert!(trend.iter().all(|d| d.count == 0));
        // Oldest to newest, ending today.
        assert_eq!(trend[0].date, NaiveDate::from_ymd_opt(2026, 3, 5).unwrap());
        assert_eq!(trend[6].date, NaiveDate::from_ymd_opt(2026, 3, 11).unwrap());
    }

    #[test]
    fn test_trend_single_attempt_today_lands_in_last_slot() {
        let tl = Timeline::new(0);
        let trend = tl.trend_7d(&[utc(2026, 3, 11, 8)], now());
        assert_eq!(trend[6].count, 1);
        assert!(trend[..6].iter().all(|d| d.count == 0));
    }

    #[test]
    fn test_trend_ignores_attempts_older_than_window() {
        let tl = Timeline::new(0);
        let trend = tl.trend_7d(&[utc(2026, 3, 4, 8), utc(2026, 3, 5, 8)], now());
        assert_eq!(trend[0].count, 1);
        assert_eq!(trend.iter().map(|d| d.count).sum::<i64>(), 1);
    }

    #[test]
    fn test_active_days() {
        let tl = Timeline::new(0);
        let trend = tl.trend_7d(&[utc(2026, 3, 11, 8), utc(2026, 3, 9, 8), utc(2026, 3, 9, 9)], now());
        assert_eq!(Timeline::active_days(&trend), 2);
    }

    #[test]
    fn test_week_start_is_most_recent_monday() {
        let tl = Timeline::new(0);
        // Wednesday the 11th → Monday the 9th.
        assert_eq!(tl.week_start(now()), NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
        // A Monday maps to itself.
        assert_eq!(
            tl.week_start(utc(2026, 3, 9, 0)),
            NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
        );
    }

    #[test]
    fn test_weekly_completed_excludes_previous_week() {
        let tl = Timeline::new(0);
        let attempts = vec![
            utc(2026, 3, 9, 0),  // Monday this week
            utc(2026, 3, 10, 9), // Tuesday this week
            utc(2026, 3, 8, 23), // Sunday last week
        ];
        assert_eq!(tl.weekly_completed(&attempts, now()), 2);
    }
}
