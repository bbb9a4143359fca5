//! Overdue penalty

use chrono::{DateTime, Duration, Utc};

/// Whole days between `due` and `returned`, or 0 when returned on time.
///
/// Partial days are dropped: 36 hours late is 1 day.
pub fn compute_penalty(due: DateTime<Utc>, returned: DateTime<Utc>) -> u32 {
    if returned <= due {
        return 0;
    }
    let late = returned - due;
    let days = late.num_milliseconds() / Duration::days(1).num_milliseconds();
    u32::try_from(days).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_time_is_free() {
        let due = Utc::now();
        assert_eq!(compute_penalty(due, due), 0);
    }

    #[test]
    fn early_return_is_free() {
        let due = Utc::now();
        assert_eq!(compute_penalty(due, due - Duration::days(1)), 0);
    }

    #[test]
    fn one_day_late() {
        let due = Utc::now();
        assert_eq!(compute_penalty(due, due + Duration::days(1)), 1);
    }

    #[test]
    fn partial_days_are_truncated() {
        let due = Utc::now();
        assert_eq!(compute_penalty(due, due + Duration::hours(36)), 1);
        assert_eq!(compute_penalty(due, due + Duration::hours(23)), 0);
        assert_eq!(compute_penalty(due, due + Duration::seconds(1)), 0);
    }

    #[test]
    fn counts_every_whole_day() {
        let due = Utc::now();
        assert_eq!(compute_penalty(due, due + Duration::days(8)), 8);
        assert_eq!(compute_penalty(due, due + Duration::days(30) + Duration::hours(23)), 30);
    }
}
