//! Daily activity tally.

use chrono::{DateTime, NaiveDate, Utc};

use crate::types::DailyActivity;

/// Activity record for `today` after one more answer.
///
/// A record from another date is ignored and a fresh one is started.
pub fn tally(current: Option<&DailyActivity>, today: NaiveDate, now: DateTime<Utc>) -> DailyActivity {
    match current {
        Some(activity) if activity.date == today => DailyActivity {
            date: today,
            count: activity.count.saturating_add(1),
            last_updated_at: now,
        },
        _ => DailyActivity {
            date: today,
            count: 1,
            last_updated_at: now,
        },
    }
}
