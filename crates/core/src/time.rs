//! Wall-clock helpers.
//!
//! All engine timestamps are Unix epoch milliseconds supplied by the caller.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, Utc};

/// Unix epoch milliseconds.
pub type TimestampMs = i64;

/// Whole seconds elapsed from `started` to `now`.
///
/// Rounds down. A clock that went backwards yields 0.
pub fn elapsed_secs(started: TimestampMs, now: TimestampMs) -> u64 {
    if now <= started {
        return 0;
    }
    ((now - started) / 1000) as u64
}

/// Where calendar days are cut when computing the reading streak.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DayBoundary {
    /// Host local time zone
    #[default]
    Local,
    /// A fixed offset from UTC
    Fixed(FixedOffset),
}

impl DayBoundary {
    /// Midnight-to-midnight UTC.
    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }

    /// Fixed offset expressed in minutes east of UTC.
    ///
    /// Returns `None` when the offset is out of range.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(Self::Fixed)
    }

    /// Calendar day containing the instant `at`.
    pub fn day_of(&self, at: TimestampMs) -> Option<NaiveDate> {
        let utc = DateTime::<Utc>::from_timestamp_millis(at)?;
        Some(match self {
            Self::Local => utc.with_timezone(&Local).date_naive(),
            Self::Fixed(offset) => utc.with_timezone(offset).date_naive(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: i64 = 86_400_000;

    #[test]
    fn test_elapsed_rounds_down() {
        assert_eq!(elapsed_secs(0, 1_999), 1);
        assert_eq!(elapsed_secs(0, 120_000), 120);
    }

    #[test]
    fn test_elapsed_never_negative() {
        assert_eq!(elapsed_secs(5_000, 1_000), 0);
        assert_eq!(elapsed_secs(5_000, 5_000), 0);
    }

    #[test]
    fn test_fixed_offset_shifts_day() {
        // 2024-03-01T23:30:00Z
        let at = 1_709_335_800_000;
        let utc = DayBoundary::utc();
        let plus_one = DayBoundary::from_offset_minutes(60).unwrap();

        assert_eq!(utc.day_of(at), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(plus_one.day_of(at), NaiveDate::from_ymd_opt(2024, 3, 2));
        assert_eq!(utc.day_of(at + DAY_MS), NaiveDate::from_ymd_opt(2024, 3, 2));
    }

    #[test]
    fn test_out_of_range_offset() {
        assert!(DayBoundary::from_offset_minutes(24 * 60).is_none());
    }
}
