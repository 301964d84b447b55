//! Database models and API types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{ApiError, Result};

// Re-export shared types from manabu-core
pub use manabu_core::{
    ActivityDay, Answer, DailyActivity, ItemProgress, ItemType, MasteryLevel, ProgressStatus,
    QuizResult, StatusBuckets, StreakState, TypeBuckets,
};

/// Default display name for learners who register without one.
pub const DEFAULT_LEARNER_NAME: &str = "Pelajar";
/// Default study level for new learners.
pub const DEFAULT_LEVEL: &str = "N5";

// === Database Entity Types ===

/// Registered learner
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Learner {
    pub id: Uuid,
    pub token: String,
    pub name: String,
    pub current_level: String,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl Learner {
    /// New learner with a fresh opaque token.
    pub fn new(name: Option<&str>, current_level: Option<&str>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            token: Uuid::new_v4().to_string(),
            name: non_blank(name).unwrap_or(DEFAULT_LEARNER_NAME).to_string(),
            current_level: non_blank(current_level).unwrap_or(DEFAULT_LEVEL).to_string(),
            created_at: now,
            last_seen_at: now,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Item progress row in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct DbItemProgress {
    pub learner_id: Uuid,
    pub item_type: String,
    pub item_id: String,
    pub level: String,
    pub correct_count: i32,
    pub wrong_count: i32,
    pub srs_level: i32,
    pub last_reviewed_at: DateTime<Utc>,
}

impl DbItemProgress {
    /// Convert to manabu-core ItemProgress
    pub fn to_core(&self) -> Result<ItemProgress> {
        let item_type = self
            .item_type
            .parse()
            .map_err(|e| ApiError::Internal(format!("stored progress row: {e}")))?;

        Ok(ItemProgress {
            item_type,
            item_id: self.item_id.clone(),
            level: self.level.clone(),
            correct_count: self.correct_count.max(0) as u32,
            wrong_count: self.wrong_count.max(0) as u32,
            mastery: MasteryLevel::new(i64::from(self.srs_level)),
            last_reviewed_at: self.last_reviewed_at,
        })
    }
}

/// Streak row in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct DbStreak {
    pub learner_id: Uuid,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_active_date: Option<NaiveDate>,
    pub total_xp: i64,
    pub today_xp: i32,
    pub today_lessons: i32,
}

impl DbStreak {
    pub fn to_core(&self) -> StreakState {
        StreakState {
            current_streak: self.current_streak.max(0) as u32,
            longest_streak: self.longest_streak.max(0) as u32,
            last_active_date: self.last_active_date,
            total_xp: self.total_xp.max(0) as u64,
            today_xp: self.today_xp.max(0) as u32,
            today_lessons: self.today_lessons.max(0) as u32,
        }
    }
}

/// Activity log row in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct DbActivity {
    pub activity_date: NaiveDate,
    pub count: i32,
    pub last_updated_at: DateTime<Utc>,
}

impl DbActivity {
    pub fn to_core(&self) -> DailyActivity {
        DailyActivity {
            date: self.activity_date,
            count: self.count.max(0) as u32,
            last_updated_at: self.last_updated_at,
        }
    }
}

/// Quiz result row in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct DbQuizResult {
    pub id: Uuid,
    pub quiz_type: String,
    pub level: String,
    pub score: i32,
    pub total_questions: i32,
    pub completed_at: DateTime<Utc>,
}

impl DbQuizResult {
    pub fn to_record(&self) -> Result<QuizRecord> {
        let quiz_type = self
            .quiz_type
            .parse()
            .map_err(|e| ApiError::Internal(format!("stored quiz row: {e}")))?;

        Ok(QuizRecord {
            id: self.id,
            result: QuizResult {
                quiz_type,
                level: self.level.clone(),
                score: self.score.max(0) as u32,
                total_questions: self.total_questions.max(0) as u32,
                completed_at: self.completed_at,
            },
        })
    }
}

/// Stored quiz result with its id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub result: QuizResult,
}

// === API Request/Response Types ===

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegisterLearnerRequest {
    pub name: Option<String>,
    pub current_level: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterLearnerResponse {
    pub learner_id: Uuid,
    pub token: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LearnerProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub current_level: String,
    pub created_at: DateTime<Utc>,
    pub streak: StreakState,
}

/// Answer submission; every field is optional so missing ones can be
/// reported as validation errors.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    #[serde(alias = "itemType")]
    pub item_type: Option<String>,
    #[serde(alias = "itemId")]
    pub item_id: Option<String>,
    pub level: Option<String>,
    #[serde(alias = "is_correct")]
    pub correct: Option<bool>,
}

impl SubmitAnswerRequest {
    pub fn validate(&self) -> std::result::Result<Answer, manabu_core::ValidationError> {
        Answer::from_fields(
            self.item_type.as_deref(),
            self.item_id.as_deref(),
            self.level.as_deref(),
            self.correct,
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    pub xp_gained: u32,
    pub mastery_level: u8,
    pub status: ProgressStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressOverviewResponse {
    pub streak: StreakState,
    pub summary: TypeBuckets,
    pub levels: std::collections::BTreeMap<String, TypeBuckets>,
    pub weekly_activity: Vec<ActivityDay>,
    pub total_items: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ActivityQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActivityResponse {
    pub days: Vec<ActivityDay>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RecordQuizRequest {
    #[serde(alias = "quizType")]
    pub quiz_type: Option<String>,
    pub level: Option<String>,
    pub score: Option<u32>,
    #[serde(alias = "totalQuestions")]
    pub total_questions: Option<u32>,
}

impl RecordQuizRequest {
    pub fn validate(
        &self,
        completed_at: DateTime<Utc>,
    ) -> std::result::Result<QuizResult, manabu_core::ValidationError> {
        use manabu_core::ValidationError::MissingField;

        QuizResult::new(
            self.quiz_type.as_deref().ok_or(MissingField("quiz_type"))?,
            self.level.as_deref().ok_or(MissingField("level"))?,
            self.score.ok_or(MissingField("score"))?,
            self.total_questions.ok_or(MissingField("total_questions"))?,
            completed_at,
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordQuizResponse {
    pub id: Uuid,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct QuizHistoryQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizHistoryResponse {
    pub results: Vec<QuizRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use manabu_core::ValidationError;

    #[test]
    fn learner_defaults_name_and_level() {
        let learner = Learner::new(Some("  "), None, Utc::now());
        assert_eq!(learner.name, DEFAULT_LEARNER_NAME);
        assert_eq!(learner.current_level, DEFAULT_LEVEL);
        assert_ne!(learner.token, learner.id.to_string());
    }

    #[test]
    fn submit_request_accepts_camel_case_aliases() {
        let request: SubmitAnswerRequest = serde_json::from_str(
            r#"{"itemType":"kanji","itemId":"k-1","level":"N5","correct":true}"#,
        )
        .unwrap();
        let answer = request.validate().unwrap();
        assert_eq!(answer.item_type, ItemType::Kanji);
        assert_eq!(answer.item_id, "k-1");
    }

    #[test]
    fn quiz_request_reports_missing_total() {
        let request = RecordQuizRequest {
            quiz_type: Some("kana".to_string()),
            level: Some("kana".to_string()),
            score: Some(3),
            total_questions: None,
        };
        assert_eq!(
            request.validate(Utc::now()).unwrap_err(),
            ValidationError::MissingField("total_questions")
        );
    }

    #[test]
    fn stored_progress_row_clamps_level() {
        let row = DbItemProgress {
            learner_id: Uuid::new_v4(),
            item_type: "grammar".to_string(),
            item_id: "g-1".to_string(),
            level: "N5".to_string(),
            correct_count: 12,
            wrong_count: 0,
            srs_level: 11,
            last_reviewed_at: Utc::now(),
        };
        let item = row.to_core().unwrap();
        assert_eq!(item.mastery, MasteryLevel::MAX);
        assert_eq!(item.status(), ProgressStatus::Mastered);
    }

    #[test]
    fn stored_progress_row_with_unknown_type_is_internal_error() {
        let row = DbItemProgress {
            learner_id: Uuid::new_v4(),
            item_type: "sentence".to_string(),
            item_id: "s-1".to_string(),
            level: "N5".to_string(),
            correct_count: 0,
            wrong_count: 0,
            srs_level: 0,
            last_reviewed_at: Utc::now(),
        };
        assert!(matches!(row.to_core(), Err(ApiError::Internal(_))));
    }
}
