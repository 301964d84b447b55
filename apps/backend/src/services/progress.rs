//! Progress operations shared by the HTTP handlers.
//!
//! Each function validates its input, talks to the store and assembles the
//! response shape. Handlers only extract and forward.

use chrono::{DateTime, Days, Utc};
use uuid::Uuid;

use crate::db::ProgressStore;
use crate::error::{ApiError, Result};
use crate::models::*;
use manabu_core::{activity_series, summarize, ProgressOutcome};

/// Days shown in the dashboard activity strip.
pub const WEEKLY_DAYS: u32 = 7;
/// Upper bound for an activity window.
pub const MAX_ACTIVITY_DAYS: u32 = 366;
pub const DEFAULT_QUIZ_LIMIT: u32 = 20;
pub const MAX_QUIZ_LIMIT: u32 = 100;

/// Create a learner with a zeroed streak.
pub async fn register_learner(
    store: &dyn ProgressStore,
    request: RegisterLearnerRequest,
    now: DateTime<Utc>,
) -> Result<RegisterLearnerResponse> {
    let learner = Learner::new(
        request.name.as_deref(),
        request.current_level.as_deref(),
        now,
    );
    store.create_learner(&learner).await?;

    tracing::info!("Registered new learner: {}", learner.id);

    Ok(RegisterLearnerResponse {
        learner_id: learner.id,
        token: learner.token,
        name: learner.name,
    })
}

pub async fn learner_profile(
    store: &dyn ProgressStore,
    learner_id: Uuid,
) -> Result<LearnerProfileResponse> {
    let learner = store
        .get_learner(learner_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("learner {learner_id}")))?;
    let streak = require_streak(store, learner_id).await?;

    Ok(LearnerProfileResponse {
        id: learner.id,
        name: learner.name,
        current_level: learner.current_level,
        created_at: learner.created_at,
        streak,
    })
}

/// Apply one answer to the learner's records.
///
/// Invalid input is rejected before the store is touched.
pub async fn submit_answer(
    store: &dyn ProgressStore,
    learner_id: Uuid,
    request: &SubmitAnswerRequest,
    now: DateTime<Utc>,
) -> Result<ProgressOutcome> {
    let answer = request.validate()?;

    let outcome = match store.submit_answer(learner_id, &answer, now).await {
        Ok(outcome) => outcome,
        Err(ApiError::NotFound(what)) => {
            tracing::error!("Learner {} has no streak record", learner_id);
            return Err(ApiError::NotFound(what));
        }
        Err(e) => return Err(e),
    };

    tracing::debug!(
        "Learner {} answered {}:{} correct={} -> level {} ({}), +{} xp",
        learner_id,
        answer.item_type,
        answer.item_id,
        answer.correct,
        outcome.item.mastery.value(),
        outcome.item.status().as_str(),
        outcome.xp_gained
    );

    Ok(outcome)
}

pub async fn streak(store: &dyn ProgressStore, learner_id: Uuid) -> Result<StreakState> {
    require_streak(store, learner_id).await
}

/// Dashboard view: streak, two-bucket summary and the last week of activity.
pub async fn overview(
    store: &dyn ProgressStore,
    learner_id: Uuid,
    now: DateTime<Utc>,
) -> Result<ProgressOverviewResponse> {
    let streak = require_streak(store, learner_id).await?;
    let items = store.list_item_progress(learner_id).await?;
    let summary = summarize(&items);
    let weekly_activity = activity_days(store, learner_id, WEEKLY_DAYS, now).await?;

    Ok(ProgressOverviewResponse {
        streak,
        summary: summary.summary,
        levels: summary.levels,
        weekly_activity,
        total_items: summary.total_items,
    })
}

/// Zero-filled daily counts for the last `days` dates, today included.
pub async fn activity(
    store: &dyn ProgressStore,
    learner_id: Uuid,
    days: Option<u32>,
    now: DateTime<Utc>,
) -> Result<ActivityResponse> {
    let days = days.unwrap_or(WEEKLY_DAYS).clamp(1, MAX_ACTIVITY_DAYS);
    Ok(ActivityResponse {
        days: activity_days(store, learner_id, days, now).await?,
    })
}

pub async fn record_quiz(
    store: &dyn ProgressStore,
    learner_id: Uuid,
    request: &RecordQuizRequest,
    now: DateTime<Utc>,
) -> Result<RecordQuizResponse> {
    let result = request.validate(now)?;
    let record = store.record_quiz_result(learner_id, &result).await?;

    tracing::info!(
        "Learner {} finished {} quiz: {}/{}",
        learner_id,
        result.quiz_type,
        result.score,
        result.total_questions
    );

    Ok(RecordQuizResponse { id: record.id })
}

pub async fn quiz_history(
    store: &dyn ProgressStore,
    learner_id: Uuid,
    limit: Option<u32>,
) -> Result<QuizHistoryResponse> {
    let limit = limit.unwrap_or(DEFAULT_QUIZ_LIMIT).clamp(1, MAX_QUIZ_LIMIT);
    Ok(QuizHistoryResponse {
        results: store.list_quiz_results(learner_id, limit).await?,
    })
}

async fn require_streak(store: &dyn ProgressStore, learner_id: Uuid) -> Result<StreakState> {
    store.get_streak(learner_id).await?.ok_or_else(|| {
        tracing::error!("Learner {} has no streak record", learner_id);
        ApiError::NotFound(format!("streak for learner {learner_id}"))
    })
}

async fn activity_days(
    store: &dyn ProgressStore,
    learner_id: Uuid,
    days: u32,
    now: DateTime<Utc>,
) -> Result<Vec<ActivityDay>> {
    let today = now.date_naive();
    let from = today
        .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
        .unwrap_or(today);
    let records = store.activity_between(learner_id, from, today).await?;
    Ok(activity_series(&records, today, days))
}
