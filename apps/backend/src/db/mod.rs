//! Record store for learner progress.
//!
//! Handlers only see [`ProgressStore`]; [`connect`] picks the engine from
//! [`StoreConfig`].

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::error::Result;
use crate::models::{Answer, DailyActivity, ItemProgress, Learner, QuizRecord, QuizResult, StreakState};
use manabu_core::ProgressOutcome;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persistence operations needed by the progress service.
///
/// `submit_answer` must apply the whole outcome or nothing, and must
/// serialize concurrent submissions from the same learner.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Create a learner together with a zeroed streak record.
    async fn create_learner(&self, learner: &Learner) -> Result<()>;

    async fn get_learner(&self, learner_id: Uuid) -> Result<Option<Learner>>;

    async fn get_learner_by_token(&self, token: &str) -> Result<Option<Learner>>;

    async fn touch_learner(&self, learner_id: Uuid, now: DateTime<Utc>) -> Result<()>;

    /// Apply one answer to the learner's item, streak and activity records.
    ///
    /// Fails with `NotFound` when the learner has no streak record.
    async fn submit_answer(
        &self,
        learner_id: Uuid,
        answer: &Answer,
        now: DateTime<Utc>,
    ) -> Result<ProgressOutcome>;

    async fn get_streak(&self, learner_id: Uuid) -> Result<Option<StreakState>>;

    async fn list_item_progress(&self, learner_id: Uuid) -> Result<Vec<ItemProgress>>;

    /// Activity records with `from <= date <= to`.
    async fn activity_between(
        &self,
        learner_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyActivity>>;

    async fn record_quiz_result(&self, learner_id: Uuid, result: &QuizResult) -> Result<QuizRecord>;

    /// Most recent quiz results first.
    async fn list_quiz_results(&self, learner_id: Uuid, limit: u32) -> Result<Vec<QuizRecord>>;
}

/// Open the configured store, running migrations where the engine has them.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn ProgressStore>> {
    match config {
        StoreConfig::Postgres {
            url,
            max_connections,
        } => {
            tracing::info!("Connecting to PostgreSQL...");
            let store = PgStore::connect(url, *max_connections).await?;

            tracing::info!("Running migrations...");
            store.run_migrations().await?;

            Ok(Arc::new(store))
        }
        StoreConfig::Memory => {
            tracing::warn!("Using in-memory store; progress is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
