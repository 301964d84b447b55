//! Learner registration and profile endpoints

use axum::{extract::State, Extension, Json};

use crate::error::Result;
use crate::models::{LearnerProfileResponse, RegisterLearnerRequest, RegisterLearnerResponse};
use crate::routes::auth::AuthenticatedLearner;
use crate::routes::AppJson;
use crate::services::progress;
use crate::AppState;

/// POST /api/learners/register
/// Creates a learner and returns its bearer token.
/// Expects a JSON object; both fields may be left out (`{}`).
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterLearnerRequest>,
) -> Result<Json<RegisterLearnerResponse>> {
    let response =
        progress::register_learner(state.store.as_ref(), payload, state.clock.now()).await?;

    Ok(Json(response))
}

/// GET /api/learners/me
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedLearner>,
) -> Result<Json<LearnerProfileResponse>> {
    let profile = progress::learner_profile(state.store.as_ref(), auth.learner_id).await?;
    Ok(Json(profile))
}
