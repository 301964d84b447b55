//! In-process store.
//!
//! Every learner owns a ledger behind its own async mutex, so submissions
//! for one learner run one at a time while different learners never
//! contend.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::ProgressStore;
use crate::error::{ApiError, Result};
use crate::models::{
    Answer, DailyActivity, ItemProgress, ItemType, Learner, QuizRecord, QuizResult, StreakState,
};
use manabu_core::{apply_answer, ProgressOutcome};

#[derive(Debug, Default)]
struct Ledger {
    /// `None` only when the record has gone missing.
    streak: Option<StreakState>,
    items: HashMap<(ItemType, String), ItemProgress>,
    activity: BTreeMap<NaiveDate, DailyActivity>,
    quizzes: Vec<QuizRecord>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    learners: DashMap<Uuid, Learner>,
    tokens: DashMap<String, Uuid>,
    ledgers: DashMap<Uuid, Arc<Mutex<Ledger>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone the ledger handle out so no map guard is held across an await.
    fn ledger(&self, learner_id: Uuid) -> Option<Arc<Mutex<Ledger>>> {
        self.ledgers.get(&learner_id).map(|l| Arc::clone(l.value()))
    }

    /// Drop a learner's streak record. The learner, items, activity and
    /// quizzes stay in place.
    ///
    /// Only useful for exercising the missing-streak integrity path.
    pub async fn remove_streak(&self, learner_id: Uuid) {
        if let Some(ledger) = self.ledger(learner_id) {
            ledger.lock().await.streak = None;
        }
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn create_learner(&self, learner: &Learner) -> Result<()> {
        if self.tokens.contains_key(&learner.token) {
            return Err(ApiError::Internal("learner token collision".to_string()));
        }
        let ledger = Ledger {
            streak: Some(StreakState::default()),
            ..Ledger::default()
        };
        self.ledgers.insert(learner.id, Arc::new(Mutex::new(ledger)));
        self.tokens.insert(learner.token.clone(), learner.id);
        self.learners.insert(learner.id, learner.clone());
        Ok(())
    }

    async fn get_learner(&self, learner_id: Uuid) -> Result<Option<Learner>> {
        Ok(self.learners.get(&learner_id).map(|l| l.value().clone()))
    }

    async fn get_learner_by_token(&self, token: &str) -> Result<Option<Learner>> {
        let Some(learner_id) = self.tokens.get(token).map(|id| *id.value()) else {
            return Ok(None);
        };
        self.get_learner(learner_id).await
    }

    async fn touch_learner(&self, learner_id: Uuid, now: DateTime<Utc>) -> Result<()> {
        if let Some(mut learner) = self.learners.get_mut(&learner_id) {
            learner.last_seen_at = now;
        }
        Ok(())
    }

    async fn submit_answer(
        &self,
        learner_id: Uuid,
        answer: &Answer,
        now: DateTime<Utc>,
    ) -> Result<ProgressOutcome> {
        let missing = || ApiError::NotFound(format!("streak for learner {learner_id}"));
        let ledger = self.ledger(learner_id).ok_or_else(missing)?;
        let mut ledger = ledger.lock().await;
        let streak = ledger.streak.as_ref().ok_or_else(missing)?;

        let key = (answer.item_type, answer.item_id.clone());
        let today = now.date_naive();
        let outcome = apply_answer(
            ledger.items.get(&key),
            streak,
            ledger.activity.get(&today),
            answer,
            now,
        );

        ledger.items.insert(key, outcome.item.clone());
        ledger.streak = Some(outcome.streak.clone());
        ledger.activity.insert(today, outcome.activity.clone());

        Ok(outcome)
    }

    async fn get_streak(&self, learner_id: Uuid) -> Result<Option<StreakState>> {
        let Some(ledger) = self.ledger(learner_id) else {
            return Ok(None);
        };
        let ledger = ledger.lock().await;
        Ok(ledger.streak.clone())
    }

    async fn list_item_progress(&self, learner_id: Uuid) -> Result<Vec<ItemProgress>> {
        let Some(ledger) = self.ledger(learner_id) else {
            return Ok(Vec::new());
        };
        let ledger = ledger.lock().await;
        Ok(ledger.items.values().cloned().collect())
    }

    async fn activity_between(
        &self,
        learner_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyActivity>> {
        if from > to {
            return Ok(Vec::new());
        }
        let Some(ledger) = self.ledger(learner_id) else {
            return Ok(Vec::new());
        };
        let ledger = ledger.lock().await;
        Ok(ledger.activity.range(from..=to).map(|(_, a)| a.clone()).collect())
    }

    async fn record_quiz_result(&self, learner_id: Uuid, result: &QuizResult) -> Result<QuizRecord> {
        let ledger = self
            .ledger(learner_id)
            .ok_or_else(|| ApiError::NotFound(format!("learner {learner_id}")))?;

        let record = QuizRecord {
            id: Uuid::new_v4(),
            result: result.clone(),
        };
        ledger.lock().await.quizzes.push(record.clone());
        Ok(record)
    }

    async fn list_quiz_results(&self, learner_id: Uuid, limit: u32) -> Result<Vec<QuizRecord>> {
        let Some(ledger) = self.ledger(learner_id) else {
            return Ok(Vec::new());
        };
        let mut results = ledger.lock().await.quizzes.clone();
        results.sort_by(|a, b| b.result.completed_at.cmp(&a.result.completed_at));
        results.truncate(limit as usize);
        Ok(results)
    }
}
