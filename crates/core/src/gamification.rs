//! Gamification counters: points and daily activity streaks.

use chrono::NaiveDate;

/// Points awarded the first time a user writes a reflection for a lesson.
pub const REFLECTION_POINTS: i32 = 10;

/// Points awarded the first time a user completes a lesson.
pub const COMPLETION_POINTS: i32 = 5;

/// Compute the streak after activity on `today`.
///
/// - No previous activity: streak starts at 1.
/// - Already active today: unchanged (at least 1).
/// - Active yesterday: incremented.
/// - Any longer gap: reset to 1.
///
/// A `last_active` date in the future (clock skew) is treated as today.
pub fn next_streak(last_active: Option<NaiveDate>, current: i32, today: NaiveDate) -> i32 {
    let Some(last) = last_active else {
        return 1;
    };
    if last >= today {
        return current.max(1);
    }
    if today.pred_opt() == Some(last) {
        current.max(0) + 1
    } else {
        1
    }
}
