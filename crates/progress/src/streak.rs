//! Daily streak tracking.

use chrono::NaiveDate;
use lectio_core::StreakState;

/// Record a chapter completion on `today`.
///
/// Same day: unchanged. Next day: `current + 1`. Any other gap: restart at 1.
/// Returns whether the streak changed.
pub fn bump_streak(streak: &mut StreakState, today: NaiveDate) -> bool {
    let current = match streak.last_read_day {
        None => 1,
        Some(last) if last == today => return false,
        Some(last) if (today - last).num_days() == 1 => streak.current + 1,
        Some(_) => 1,
    };

    streak.current = current;
    streak.best = streak.best.max(current);
    streak.last_read_day = Some(today);
    true
}
