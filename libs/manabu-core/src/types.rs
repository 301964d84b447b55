//! Core types for learner progress.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// Kind of content item a learner can answer on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    #[serde(alias = "vocabulary")]
    Vocab,
    Kanji,
    Grammar,
    Kana,
}

impl ItemType {
    /// Every item type, in display order.
    pub const ALL: [ItemType; 4] = [Self::Vocab, Self::Kanji, Self::Grammar, Self::Kana];

    /// Get the item type name as stored and serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vocab => "vocab",
            Self::Kanji => "kanji",
            Self::Grammar => "grammar",
            Self::Kana => "kana",
        }
    }
}

impl FromStr for ItemType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "vocab" | "vocabulary" => Ok(Self::Vocab),
            "kanji" => Ok(Self::Kanji),
            "grammar" => Ok(Self::Grammar),
            "kana" => Ok(Self::Kana),
            other => Err(ValidationError::UnknownItemType(other.to_string())),
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Learning status bucket of a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Learning,
    Reviewing,
    Mastered,
}

impl ProgressStatus {
    /// Derive the status from a mastery level.
    pub fn from_level(level: MasteryLevel) -> Self {
        match level.value() {
            l if l >= MasteryLevel::MASTERED_AT => Self::Mastered,
            l if l >= MasteryLevel::REVIEWING_AT => Self::Reviewing,
            _ => Self::Learning,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Learning => "learning",
            Self::Reviewing => "reviewing",
            Self::Mastered => "mastered",
        }
    }
}

/// Mastery level of an item, always within `0..=8`.
///
/// Construction clamps out-of-range values, so a `MasteryLevel` read back
/// from storage can never leave the valid range.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "i64", into = "u8")]
pub struct MasteryLevel(u8);

impl MasteryLevel {
    pub const MIN: MasteryLevel = MasteryLevel(0);
    pub const MAX: MasteryLevel = MasteryLevel(8);

    /// Lowest level counted as mastered.
    pub const MASTERED_AT: u8 = 5;
    /// Lowest level counted as reviewing.
    pub const REVIEWING_AT: u8 = 2;

    /// Step applied on a correct answer.
    pub const CORRECT_STEP: u8 = 1;
    /// Step applied on an incorrect answer.
    pub const INCORRECT_STEP: u8 = 2;

    /// Create a level, clamping into `0..=8`.
    pub fn new(value: i64) -> Self {
        Self(value.clamp(0, i64::from(Self::MAX.0)) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Level after a correct answer.
    pub fn promote(self) -> Self {
        Self((self.0 + Self::CORRECT_STEP).min(Self::MAX.0))
    }

    /// Level after an incorrect answer.
    pub fn demote(self) -> Self {
        Self(self.0.saturating_sub(Self::INCORRECT_STEP))
    }

    pub fn status(self) -> ProgressStatus {
        ProgressStatus::from_level(self)
    }
}

impl From<i64> for MasteryLevel {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<MasteryLevel> for u8 {
    fn from(level: MasteryLevel) -> Self {
        level.0
    }
}

/// A learner's answer on one content item, already validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub item_type: ItemType,
    pub item_id: String,
    pub level: String,
    pub correct: bool,
}

impl Answer {
    /// Build an answer from raw, possibly missing request fields.
    pub fn from_fields(
        item_type: Option<&str>,
        item_id: Option<&str>,
        level: Option<&str>,
        correct: Option<bool>,
    ) -> Result<Self> {
        let item_type = required("item_type", item_type)?.parse()?;
        let item_id = required("item_id", item_id)?.to_string();
        let level = required("level", level)?.to_string();
        let correct = correct.ok_or(ValidationError::MissingField("correct"))?;

        Ok(Self {
            item_type,
            item_id,
            level,
            correct,
        })
    }
}

fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str> {
    match value {
        None => Err(ValidationError::MissingField(field)),
        Some(v) if v.trim().is_empty() => Err(ValidationError::EmptyField(field)),
        Some(v) => Ok(v),
    }
}

/// Progress on one (learner, item) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemProgress {
    pub item_type: ItemType,
    pub item_id: String,
    pub level: String,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub mastery: MasteryLevel,
    pub last_reviewed_at: DateTime<Utc>,
}

impl ItemProgress {
    pub fn status(&self) -> ProgressStatus {
        self.mastery.status()
    }
}

/// Streak and XP counters, one per learner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_active_date: Option<NaiveDate>,
    pub total_xp: u64,
    pub today_xp: u32,
    pub today_lessons: u32,
}

/// Number of answers a learner submitted on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub count: u32,
    pub last_updated_at: DateTime<Utc>,
}

/// A finished quiz, stored as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub quiz_type: ItemType,
    pub level: String,
    pub score: u32,
    pub total_questions: u32,
    pub completed_at: DateTime<Utc>,
}

impl QuizResult {
    /// Largest quiz a learner can submit.
    pub const MAX_QUESTIONS: u32 = 1_000;

    /// Validate and build a quiz result.
    pub fn new(
        quiz_type: &str,
        level: &str,
        score: u32,
        total_questions: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<Self> {
        let quiz_type = required("quiz_type", Some(quiz_type))?.parse()?;
        let level = required("level", Some(level))?.to_string();

        if !(1..=Self::MAX_QUESTIONS).contains(&total_questions) || score > total_questions {
            return Err(ValidationError::InvalidQuizScore {
                score,
                total: total_questions,
            });
        }

        Ok(Self {
            quiz_type,
            level,
            score,
            total_questions,
            completed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_thresholds() {
        let statuses: Vec<_> = (0..=8).map(|l| MasteryLevel::new(l).status()).collect();
        assert_eq!(
            statuses,
            vec![
                ProgressStatus::Learning,
                ProgressStatus::Learning,
                ProgressStatus::Reviewing,
                ProgressStatus::Reviewing,
                ProgressStatus::Reviewing,
                ProgressStatus::Mastered,
                ProgressStatus::Mastered,
                ProgressStatus::Mastered,
                ProgressStatus::Mastered,
            ]
        );
    }

    #[test]
    fn mastery_level_clamps_on_construction() {
        assert_eq!(MasteryLevel::new(-3), MasteryLevel::MIN);
        assert_eq!(MasteryLevel::new(42), MasteryLevel::MAX);
        assert_eq!(MasteryLevel::new(4).value(), 4);
    }

    #[test]
    fn promote_and_demote_stay_in_range() {
        assert_eq!(MasteryLevel::MAX.promote(), MasteryLevel::MAX);
        assert_eq!(MasteryLevel::new(1).demote(), MasteryLevel::MIN);
        assert_eq!(MasteryLevel::new(5).demote().value(), 3);
    }

    #[test]
    fn mastery_level_deserializes_clamped() {
        let level: MasteryLevel = serde_json::from_str("12").unwrap();
        assert_eq!(level, MasteryLevel::MAX);
        assert_eq!(serde_json::to_string(&MasteryLevel::new(3)).unwrap(), "3");
    }

    #[test]
    fn item_type_parses_both_vocab_spellings() {
        assert_eq!("vocab".parse::<ItemType>().unwrap(), ItemType::Vocab);
        assert_eq!("vocabulary".parse::<ItemType>().unwrap(), ItemType::Vocab);
        assert_eq!(
            "hiragana".parse::<ItemType>(),
            Err(ValidationError::UnknownItemType("hiragana".to_string()))
        );
    }

    #[test]
    fn item_type_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&ItemType::Kanji).unwrap(), "\"kanji\"");
        let parsed: ItemType = serde_json::from_str("\"vocabulary\"").unwrap();
        assert_eq!(parsed, ItemType::Vocab);
    }

    #[test]
    fn answer_from_fields_reports_missing_field() {
        let err = Answer::from_fields(Some("kanji"), None, Some("N5"), Some(true)).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("item_id"));

        let err = Answer::from_fields(Some("kanji"), Some("k1"), Some("N5"), None).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("correct"));
    }

    #[test]
    fn answer_from_fields_rejects_blank_values() {
        let err = Answer::from_fields(Some("kanji"), Some("k1"), Some("  "), Some(false)).unwrap_err();
        assert_eq!(err, ValidationError::EmptyField("level"));
    }

    #[test]
    fn quiz_result_rejects_oversized_quiz() {
        let now = Utc::now();
        let err = QuizResult::new("kana", "kana", 3_000_000_000, 3_000_000_000, now).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidQuizScore {
                score: 3_000_000_000,
                total: 3_000_000_000
            }
        );
        assert!(QuizResult::new("kana", "kana", 1_000, QuizResult::MAX_QUESTIONS, now).is_ok());
    }

    #[test]
    fn answer_from_fields_accepts_valid_input() {
        let answer = Answer::from_fields(Some("kana"), Some("a"), Some("kana"), Some(false)).unwrap();
        assert_eq!(answer.item_type, ItemType::Kana);
        assert!(!answer.correct);
    }

    #[test]
    fn quiz_result_rejects_score_above_total() {
        let err = QuizResult::new("vocab", "N5", 11, 10, Utc::now()).unwrap_err();
        assert_eq!(err, ValidationError::InvalidQuizScore { score: 11, total: 10 });
    }

    #[test]
    fn quiz_result_rejects_empty_quiz() {
        assert!(QuizResult::new("vocab", "N5", 0, 0, Utc::now()).is_err());
    }

    #[test]
    fn quiz_result_accepts_perfect_score() {
        let quiz = QuizResult::new("grammar", "N5", 10, 10, Utc::now()).unwrap();
        assert_eq!(quiz.quiz_type, ItemType::Grammar);
    }
}
