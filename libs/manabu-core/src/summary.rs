//! Aggregate progress view.
//!
//! Collapses the three per-item statuses into two buckets: `mastered` and
//! `learning`. Reviewing items count as learning here.

use std::collections::{BTreeMap, HashMap};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::{DailyActivity, ItemProgress, ItemType, ProgressStatus};

/// Mastered vs not-yet-mastered counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBuckets {
    pub learning: u32,
    pub mastered: u32,
}

impl StatusBuckets {
    fn add(&mut self, status: ProgressStatus) {
        match status {
            ProgressStatus::Mastered => self.mastered += 1,
            ProgressStatus::Learning | ProgressStatus::Reviewing => self.learning += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.learning + self.mastered
    }
}

/// Buckets for every item type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeBuckets {
    pub vocab: StatusBuckets,
    pub kanji: StatusBuckets,
    pub grammar: StatusBuckets,
    pub kana: StatusBuckets,
}

impl TypeBuckets {
    pub fn get(&self, item_type: ItemType) -> &StatusBuckets {
        match item_type {
            ItemType::Vocab => &self.vocab,
            ItemType::Kanji => &self.kanji,
            ItemType::Grammar => &self.grammar,
            ItemType::Kana => &self.kana,
        }
    }

    fn get_mut(&mut self, item_type: ItemType) -> &mut StatusBuckets {
        match item_type {
            ItemType::Vocab => &mut self.vocab,
            ItemType::Kanji => &mut self.kanji,
            ItemType::Grammar => &mut self.grammar,
            ItemType::Kana => &mut self.kana,
        }
    }
}

/// Progress grouped by item type and by level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub summary: TypeBuckets,
    pub levels: BTreeMap<String, TypeBuckets>,
    pub total_items: usize,
}

/// Group a learner's item progress into the two-bucket summary.
pub fn summarize<'a, I>(items: I) -> ProgressSummary
where
    I: IntoIterator<Item = &'a ItemProgress>,
{
    let mut summary = ProgressSummary::default();

    for item in items {
        let status = item.status();
        summary.summary.get_mut(item.item_type).add(status);
        summary
            .levels
            .entry(item.level.clone())
            .or_default()
            .get_mut(item.item_type)
            .add(status);
        summary.total_items += 1;
    }

    summary
}

/// One day of the activity series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDay {
    pub date: NaiveDate,
    pub count: u32,
}

/// Daily counts for the `days` dates ending at `today`, oldest first.
///
/// Dates without a record are reported with a zero count.
pub fn activity_series(records: &[DailyActivity], today: NaiveDate, days: u32) -> Vec<ActivityDay> {
    let counts: HashMap<NaiveDate, u32> = records.iter().map(|r| (r.date, r.count)).collect();

    (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(u64::from(back))))
        .map(|date| ActivityDay {
            date,
            count: counts.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MasteryLevel;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn item(item_type: ItemType, level: &str, mastery: i64) -> ItemProgress {
        ItemProgress {
            item_type,
            item_id: format!("{item_type}-{mastery}"),
            level: level.to_string(),
            correct_count: 0,
            wrong_count: 0,
            mastery: MasteryLevel::new(mastery),
            last_reviewed_at: Utc::now(),
        }
    }

    #[test]
    fn reviewing_items_count_as_learning() {
        let items = vec![
            item(ItemType::Kanji, "N5", 0),
            item(ItemType::Kanji, "N5", 3),
            item(ItemType::Kanji, "N5", 6),
        ];
        let summary = summarize(&items);
        assert_eq!(
            summary.summary.kanji,
            StatusBuckets {
                learning: 2,
                mastered: 1
            }
        );
        assert_eq!(summary.total_items, 3);
    }

    #[test]
    fn groups_by_level_and_type() {
        let items = vec![
            item(ItemType::Vocab, "N5", 5),
            item(ItemType::Vocab, "N4", 1),
            item(ItemType::Grammar, "N5", 2),
            item(ItemType::Kana, "kana", 8),
        ];
        let summary = summarize(&items);

        assert_eq!(summary.levels.len(), 3);
        assert_eq!(summary.levels["N5"].vocab.mastered, 1);
        assert_eq!(summary.levels["N5"].grammar.learning, 1);
        assert_eq!(summary.levels["N4"].vocab.learning, 1);
        assert_eq!(summary.levels["kana"].kana.mastered, 1);
        assert_eq!(summary.summary.vocab.total(), 2);
    }

    #[test]
    fn empty_progress_has_zero_buckets() {
        let summary = summarize(&Vec::<ItemProgress>::new());
        assert_eq!(summary, ProgressSummary::default());
        for item_type in ItemType::ALL {
            assert_eq!(summary.summary.get(item_type).total(), 0);
        }
    }

    #[test]
    fn activity_series_is_dense_and_oldest_first() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let records = vec![
            DailyActivity {
                date: today,
                count: 4,
                last_updated_at: Utc::now(),
            },
            DailyActivity {
                date: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
                count: 2,
                last_updated_at: Utc::now(),
            },
            DailyActivity {
                date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                count: 9,
                last_updated_at: Utc::now(),
            },
        ];

        let series = activity_series(&records, today, 7);
        let counts: Vec<u32> = series.iter().map(|d| d.count).collect();

        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(series[6].date, today);
        assert_eq!(counts, vec![0, 0, 0, 2, 0, 0, 4]);
    }
}
