//! Per-item mastery update.

use chrono::{DateTime, Utc};

use crate::types::{Answer, ItemProgress, MasteryLevel};

/// Next progress record for the answered item.
///
/// A first answer starts the item at level 1 (correct) or 0 (incorrect).
/// Later answers move the level up by one or down by two, clamped to `0..=8`.
pub fn update_item(current: Option<&ItemProgress>, answer: &Answer, now: DateTime<Utc>) -> ItemProgress {
    match current {
        None => ItemProgress {
            item_type: answer.item_type,
            item_id: answer.item_id.clone(),
            level: answer.level.clone(),
            correct_count: u32::from(answer.correct),
            wrong_count: u32::from(!answer.correct),
            mastery: if answer.correct {
                MasteryLevel::MIN.promote()
            } else {
                MasteryLevel::MIN
            },
            last_reviewed_at: now,
        },
        Some(item) => {
            let mut next = item.clone();
            if answer.correct {
                next.correct_count = next.correct_count.saturating_add(1);
                next.mastery = item.mastery.promote();
            } else {
                next.wrong_count = next.wrong_count.saturating_add(1);
                next.mastery = item.mastery.demote();
            }
            next.last_reviewed_at = now;
            next
        }
    }
}
