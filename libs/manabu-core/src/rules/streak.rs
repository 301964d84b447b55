//! Streak and XP update.

use chrono::NaiveDate;

use crate::types::StreakState;

/// Next streak state after an answer worth `xp` on calendar date `today`.
///
/// The longest streak is only compared against the incremented streak on a
/// consecutive day. On any other day it is compared against the previous
/// current streak, never against a streak that was just reset. It is floored
/// at the resulting current streak so a learner's first active day counts.
pub fn update_streak(current: &StreakState, xp: u32, today: NaiveDate) -> StreakState {
    let is_new_day = current.last_active_date != Some(today);
    let was_yesterday = match (current.last_active_date, today.pred_opt()) {
        (Some(last), Some(yesterday)) => last == yesterday,
        _ => false,
    };
    let continues = is_new_day && was_yesterday;

    let current_streak = match (is_new_day, was_yesterday) {
        (false, _) => current.current_streak,
        (true, true) => current.current_streak.saturating_add(1),
        (true, false) => 1,
    };

    let candidate = if continues {
        current.current_streak.saturating_add(1)
    } else {
        current.current_streak
    };

    StreakState {
        current_streak,
        longest_streak: current.longest_streak.max(candidate).max(current_streak),
        last_active_date: Some(today),
        total_xp: current.total_xp.saturating_add(u64::from(xp)),
        today_xp: if is_new_day {
            xp
        } else {
            current.today_xp.saturating_add(xp)
        },
        today_lessons: if is_new_day {
            1
        } else {
            current.today_lessons.saturating_add(1)
        },
    }
}
