//! Progress endpoints

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedLearner;
use crate::routes::AppJson;
use crate::services::progress;
use crate::AppState;

/// GET /api/progress
pub async fn overview(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedLearner>,
) -> Result<Json<ProgressOverviewResponse>> {
    let view = progress::overview(state.store.as_ref(), auth.learner_id, state.clock.now()).await?;
    Ok(Json(view))
}

/// POST /api/progress/update
/// Records one answer and returns the XP it earned
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedLearner>,
    AppJson(payload): AppJson<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>> {
    let outcome = progress::submit_answer(
        state.store.as_ref(),
        auth.learner_id,
        &payload,
        state.clock.now(),
    )
    .await?;

    Ok(Json(SubmitAnswerResponse {
        xp_gained: outcome.xp_gained,
        mastery_level: outcome.item.mastery.value(),
        status: outcome.item.status(),
    }))
}

/// GET /api/progress/streak
pub async fn streak(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedLearner>,
) -> Result<Json<StreakState>> {
    let streak = progress::streak(state.store.as_ref(), auth.learner_id).await?;
    Ok(Json(streak))
}

/// GET /api/progress/activity?days=N
pub async fn activity(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedLearner>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ActivityResponse>> {
    let days = progress::activity(
        state.store.as_ref(),
        auth.learner_id,
        query.days,
        state.clock.now(),
    )
    .await?;

    Ok(Json(days))
}

/// POST /api/progress/quiz
pub async fn record_quiz(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedLearner>,
    AppJson(payload): AppJson<RecordQuizRequest>,
) -> Result<Json<RecordQuizResponse>> {
    let response = progress::record_quiz(
        state.store.as_ref(),
        auth.learner_id,
        &payload,
        state.clock.now(),
    )
    .await?;

    Ok(Json(response))
}

/// GET /api/progress/quiz?limit=N
pub async fn quiz_history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedLearner>,
    Query(query): Query<QuizHistoryQuery>,
) -> Result<Json<QuizHistoryResponse>> {
    let history = progress::quiz_history(state.store.as_ref(), auth.learner_id, query.limit).await?;
    Ok(Json(history))
}
