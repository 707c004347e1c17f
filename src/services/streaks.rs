//! Consecutive-day streak calculation over the wellness activity log.
//!
//! All calendar-day bucketing uses the UTC date of the activity timestamp;
//! "today" is the UTC date at the time of the call. Multiple activities on
//! the same day count once.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::models::streak::CurrentStreak;

/// Compute the current streak ending at `today`.
///
/// The streak survives a single day of grace: if the most recent activity
/// was yesterday the run is still alive (but `needs_activity` is set). Any
/// gap beyond that breaks it and the count is 0.
pub fn current_streak(timestamps: &[DateTime<Utc>], today: NaiveDate) -> CurrentStreak {
    let last_activity = timestamps.iter().max().copied();

    let mut days: Vec<NaiveDate> = timestamps.iter().map(|ts| ts.date_naive()).collect();
    days.sort_unstable();
    days.dedup();

    let last_day = match days.last() {
        Some(d) => *d,
        None => {
            return CurrentStreak {
                count: 0,
                last_activity: None,
                needs_activity: true,
                active_today: false,
            }
        }
    };

    let active_today = last_day == today;
    if !active_today && last_day != today - Duration::days(1) {
        // Streak broken: most recent activity is older than yesterday.
        return CurrentStreak {
            count: 0,
            last_activity,
            needs_activity: true,
            active_today: false,
        };
    }

    // Walk backward from the most recent activity day, counting strictly
    // consecutive days.
    let mut count = 1;
    for pair in days.windows(2).rev() {
        if pair[0] + Duration::days(1) == pair[1] {
            count += 1;
        } else {
            break;
        }
    }

    CurrentStreak {
        count,
        last_activity,
        needs_activity: !active_today,
        active_today,
    }
}

/// Drop activity at or before the most recent admin reset. A reset
/// restarts the streak from zero: earlier history must not resurrect the
/// count on the next recomputation.
pub fn since_reset(
    timestamps: &[DateTime<Utc>],
    reset_at: Option<DateTime<Utc>>,
) -> Vec<DateTime<Utc>> {
    match reset_at {
        Some(cutoff) => timestamps.iter().copied().filter(|ts| *ts > cutoff).collect(),
        None => timestamps.to_vec(),
    }
}

/// Longest consecutive-day run anywhere in the history, independent of
/// whether the streak is still alive today.
pub fn longest_streak(timestamps: &[DateTime<Utc>]) -> i32 {
    let mut days: Vec<NaiveDate> = timestamps.iter().map(|ts| ts.date_naive()).collect();
    days.sort_unstable();
    days.dedup();

    if days.is_empty() {
        return 0;
    }

    let mut longest = 1;
    let mut run = 1;
    for pair in days.windows(2) {
        if pair[0] + Duration::days(1) == pair[1] {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(date: NaiveDate, hour: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap())
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_history_has_no_streak() {
        let result = current_streak(&[], day(2025, 6, 10));
        assert_eq!(result.count, 0);
        assert!(result.needs_activity);
        assert!(!result.active_today);
        assert_eq!(longest_streak(&[]), 0);
    }

    #[test]
    fn single_activity_today_is_streak_of_one() {
        let today = day(2025, 6, 10);
        let result = current_streak(&[ts(today, 9)], today);
        assert_eq!(result.count, 1);
        assert!(result.active_today);
        assert!(!result.needs_activity);
    }

    #[test]
    fn three_consecutive_days_ending_today() {
        let today = day(2025, 6, 10);
        let history = vec![
            ts(day(2025, 6, 8), 20),
            ts(day(2025, 6, 9), 7),
            ts(today, 12),
        ];
        let result = current_streak(&history, today);
        assert_eq!(result.count, 3);
        assert!(!result.needs_activity);
        assert!(result.active_today);
    }

    #[test]
    fn yesterday_only_keeps_streak_but_needs_activity() {
        let today = day(2025, 6, 10);
        let history = vec![ts(day(2025, 6, 8), 10), ts(day(2025, 6, 9), 10)];
        let result = current_streak(&history, today);
        assert_eq!(result.count, 2);
        assert!(result.needs_activity);
        assert!(!result.active_today);
    }

    #[test]
    fn gap_of_two_days_breaks_streak() {
        let today = day(2025, 6, 10);
        let history = vec![ts(day(2025, 6, 7), 10), ts(day(2025, 6, 8), 10)];
        let result = current_streak(&history, today);
        assert_eq!(result.count, 0);
        assert!(result.needs_activity);
    }

    #[test]
    fn multiple_activities_same_day_count_once() {
        let today = day(2025, 6, 10);
        let history = vec![
            ts(day(2025, 6, 9), 8),
            ts(day(2025, 6, 9), 13),
            ts(day(2025, 6, 9), 22),
            ts(today, 6),
            ts(today, 18),
        ];
        let result = current_streak(&history, today);
        assert_eq!(result.count, 2);
    }

    #[test]
    fn gap_in_middle_stops_backward_walk() {
        let today = day(2025, 6, 10);
        let history = vec![
            ts(day(2025, 6, 5), 10),
            ts(day(2025, 6, 6), 10),
            // gap on the 7th and 8th
            ts(day(2025, 6, 9), 10),
            ts(today, 10),
        ];
        let result = current_streak(&history, today);
        assert_eq!(result.count, 2);
    }

    #[test]
    fn longest_streak_scans_whole_history() {
        let history = vec![
            ts(day(2025, 5, 1), 10),
            ts(day(2025, 5, 2), 10),
            ts(day(2025, 5, 3), 10),
            ts(day(2025, 5, 4), 10),
            // gap
            ts(day(2025, 5, 20), 10),
            ts(day(2025, 5, 21), 10),
        ];
        assert_eq!(longest_streak(&history), 4);
    }

    #[test]
    fn reset_zeroes_recomputed_streak() {
        // A ten-day run ending today, then an admin reset: recomputation
        // over the post-reset window must report 0, not the old run.
        let today = day(2025, 6, 10);
        let history: Vec<DateTime<Utc>> =
            (1..=10).map(|d| ts(day(2025, 6, d), 9)).collect();
        let reset_at = ts(today, 12);

        let effective = since_reset(&history, Some(reset_at));
        assert!(effective.is_empty());
        let result = current_streak(&effective, today);
        assert_eq!(result.count, 0);
        assert!(result.needs_activity);
    }

    #[test]
    fn streak_restarts_after_reset() {
        let today = day(2025, 6, 10);
        let history = vec![
            ts(day(2025, 6, 7), 9),
            ts(day(2025, 6, 8), 9),
            ts(day(2025, 6, 9), 9),
            // reset happened the morning of the 9th
            ts(day(2025, 6, 9), 20),
            ts(today, 9),
        ];
        let reset_at = ts(day(2025, 6, 9), 12);

        let effective = since_reset(&history, Some(reset_at));
        assert_eq!(effective.len(), 2);
        let result = current_streak(&effective, today);
        assert_eq!(result.count, 2);
    }

    #[test]
    fn no_reset_keeps_full_history() {
        let history = vec![ts(day(2025, 6, 9), 9), ts(day(2025, 6, 10), 9)];
        assert_eq!(since_reset(&history, None), history);
    }

    #[test]
    fn longest_is_at_least_current() {
        // Property from the streak invariants: for any history,
        // longest_streak >= current_streak.count.
        let today = day(2025, 6, 10);
        let histories: Vec<Vec<DateTime<Utc>>> = vec![
            vec![],
            vec![ts(today, 1)],
            vec![ts(day(2025, 6, 8), 1), ts(day(2025, 6, 9), 1), ts(today, 1)],
            vec![ts(day(2025, 6, 1), 1), ts(day(2025, 6, 2), 1)],
            vec![
                ts(day(2025, 6, 1), 1),
                ts(day(2025, 6, 2), 1),
                ts(day(2025, 6, 3), 1),
                ts(day(2025, 6, 9), 1),
                ts(today, 1),
            ],
        ];
        for history in &histories {
            let current = current_streak(history, today);
            assert!(
                longest_streak(history) >= current.count,
                "longest < current for history {history:?}"
            );
        }
    }
}
