//! Progress update rule.
//!
//! One answer produces three record updates: the item's mastery, the
//! learner's streak/XP counters and the daily activity tally. The rule is
//! pure; callers load the current records, apply it and persist the outcome
//! as one unit.

pub mod activity;
pub mod mastery;
pub mod streak;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{Answer, DailyActivity, ItemProgress, StreakState};

/// XP for a correct answer.
pub const CORRECT_XP: u32 = 10;
/// XP for an incorrect answer.
pub const INCORRECT_XP: u32 = 2;

/// XP awarded for an answer. Wrong answers still earn XP.
pub fn xp_for(correct: bool) -> u32 {
    if correct {
        CORRECT_XP
    } else {
        INCORRECT_XP
    }
}

/// Records to persist after applying an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressOutcome {
    pub item: ItemProgress,
    pub streak: StreakState,
    pub activity: DailyActivity,
    pub xp_gained: u32,
}

/// Apply one answer to the learner's current records.
///
/// `activity` is today's activity record if one exists; `today` is the UTC
/// calendar date of `now`.
pub fn apply_answer(
    item: Option<&ItemProgress>,
    streak: &StreakState,
    activity: Option<&DailyActivity>,
    answer: &Answer,
    now: DateTime<Utc>,
) -> ProgressOutcome {
    let today = now.date_naive();
    let xp_gained = xp_for(answer.correct);

    ProgressOutcome {
        item: mastery::update_item(item, answer, now),
        streak: streak::update_streak(streak, xp_gained, today),
        activity: activity::tally(activity, today, now),
        xp_gained,
    }
}
