//! PostgreSQL database operations

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use super::ProgressStore;
use crate::error::{ApiError, Result};
use crate::models::*;
use manabu_core::{apply_answer, ProgressOutcome};

/// Store backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }
}

/// Narrow a counter to the INTEGER column type, refusing values that would wrap.
fn to_i32(value: u32, column: &'static str) -> Result<i32> {
    i32::try_from(value).map_err(|_| out_of_range(column, value))
}

fn out_of_range(column: &'static str, value: impl std::fmt::Display) -> ApiError {
    ApiError::BadRequest(format!("{column} out of range: {value}"))
}

#[async_trait]
impl ProgressStore for PgStore {
    // === Learner Repository ===

    async fn create_learner(&self, learner: &Learner) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO learners (id, token, name, current_level, created_at, last_seen_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(learner.id)
        .bind(&learner.token)
        .bind(&learner.name)
        .bind(&learner.current_level)
        .bind(learner.created_at)
        .bind(learner.last_seen_at)
        .execute(&mut *tx)
        .await?;

        // Every learner starts with a zeroed streak row
        sqlx::query(
            r#"
            INSERT INTO streaks (learner_id)
            VALUES ($1)
            "#,
        )
        .bind(learner.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_learner(&self, learner_id: Uuid) -> Result<Option<Learner>> {
        let learner = sqlx::query_as::<_, Learner>(
            r#"
            SELECT id, token, name, current_level, created_at, last_seen_at
            FROM learners
            WHERE id = $1
            "#,
        )
        .bind(learner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(learner)
    }

    async fn get_learner_by_token(&self, token: &str) -> Result<Option<Learner>> {
        let learner = sqlx::query_as::<_, Learner>(
            r#"
            SELECT id, token, name, current_level, created_at, last_seen_at
            FROM learners
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(learner)
    }

    async fn touch_learner(&self, learner_id: Uuid, now: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE learners
            SET last_seen_at = $2
            WHERE id = $1
            "#,
        )
        .bind(learner_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // === Progress Repository ===

    async fn submit_answer(
        &self,
        learner_id: Uuid,
        answer: &Answer,
        now: DateTime<Utc>,
    ) -> Result<ProgressOutcome> {
        let today = now.date_naive();
        let mut tx = self.pool.begin().await?;

        // Lock the streak row first; same-learner submissions queue here
        let streak = sqlx::query_as::<_, DbStreak>(
            r#"
            SELECT learner_id, current_streak, longest_streak, last_active_date,
                   total_xp, today_xp, today_lessons
            FROM streaks
            WHERE learner_id = $1
            FOR UPDATE
            "#,
        )
        .bind(learner_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("streak for learner {learner_id}")))?
        .to_core();

        let item = sqlx::query_as::<_, DbItemProgress>(
            r#"
            SELECT learner_id, item_type, item_id, level, correct_count, wrong_count,
                   srs_level, last_reviewed_at
            FROM item_progress
            WHERE learner_id = $1 AND item_type = $2 AND item_id = $3
            "#,
        )
        .bind(learner_id)
        .bind(answer.item_type.as_str())
        .bind(&answer.item_id)
        .fetch_optional(&mut *tx)
        .await?
        .map(|row| row.to_core())
        .transpose()?;

        let activity = sqlx::query_as::<_, DbActivity>(
            r#"
            SELECT activity_date, count, last_updated_at
            FROM activity_logs
            WHERE learner_id = $1 AND activity_date = $2
            "#,
        )
        .bind(learner_id)
        .bind(today)
        .fetch_optional(&mut *tx)
        .await?
        .map(|row| row.to_core());

        let outcome = apply_answer(item.as_ref(), &streak, activity.as_ref(), answer, now);

        sqlx::query(
            r#"
            INSERT INTO item_progress (learner_id, item_type, item_id, level, correct_count,
                                       wrong_count, srs_level, last_reviewed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (learner_id, item_type, item_id) DO UPDATE SET
                level = EXCLUDED.level,
                correct_count = EXCLUDED.correct_count,
                wrong_count = EXCLUDED.wrong_count,
                srs_level = EXCLUDED.srs_level,
                last_reviewed_at = EXCLUDED.last_reviewed_at
            "#,
        )
        .bind(learner_id)
        .bind(outcome.item.item_type.as_str())
        .bind(&outcome.item.item_id)
        .bind(&outcome.item.level)
        .bind(to_i32(outcome.item.correct_count, "correct_count")?)
        .bind(to_i32(outcome.item.wrong_count, "wrong_count")?)
        .bind(i32::from(outcome.item.mastery.value()))
        .bind(outcome.item.last_reviewed_at)
        .execute(&mut *tx)
        .await?;

        let total_xp = i64::try_from(outcome.streak.total_xp)
            .map_err(|_| out_of_range("total_xp", outcome.streak.total_xp))?;
        sqlx::query(
            r#"
            UPDATE streaks SET
                current_streak = $2,
                longest_streak = $3,
                last_active_date = $4,
                total_xp = $5,
                today_xp = $6,
                today_lessons = $7
            WHERE learner_id = $1
            "#,
        )
        .bind(learner_id)
        .bind(to_i32(outcome.streak.current_streak, "current_streak")?)
        .bind(to_i32(outcome.streak.longest_streak, "longest_streak")?)
        .bind(outcome.streak.last_active_date)
        .bind(total_xp)
        .bind(to_i32(outcome.streak.today_xp, "today_xp")?)
        .bind(to_i32(outcome.streak.today_lessons, "today_lessons")?)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO activity_logs (learner_id, activity_date, count, last_updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (learner_id, activity_date) DO UPDATE SET
                count = EXCLUDED.count,
                last_updated_at = EXCLUDED.last_updated_at
            "#,
        )
        .bind(learner_id)
        .bind(outcome.activity.date)
        .bind(to_i32(outcome.activity.count, "count")?)
        .bind(outcome.activity.last_updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(outcome)
    }

    async fn get_streak(&self, learner_id: Uuid) -> Result<Option<StreakState>> {
        let streak = sqlx::query_as::<_, DbStreak>(
            r#"
            SELECT learner_id, current_streak, longest_streak, last_active_date,
                   total_xp, today_xp, today_lessons
            FROM streaks
            WHERE learner_id = $1
            "#,
        )
        .bind(learner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(streak.map(|row| row.to_core()))
    }

    async fn list_item_progress(&self, learner_id: Uuid) -> Result<Vec<ItemProgress>> {
        let rows = sqlx::query_as::<_, DbItemProgress>(
            r#"
            SELECT learner_id, item_type, item_id, level, correct_count, wrong_count,
                   srs_level, last_reviewed_at
            FROM item_progress
            WHERE learner_id = $1
            ORDER BY item_type, item_id
            "#,
        )
        .bind(learner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(DbItemProgress::to_core).collect()
    }

    async fn activity_between(
        &self,
        learner_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyActivity>> {
        let rows = sqlx::query_as::<_, DbActivity>(
            r#"
            SELECT activity_date, count, last_updated_at
            FROM activity_logs
            WHERE learner_id = $1 AND activity_date BETWEEN $2 AND $3
            ORDER BY activity_date
            "#,
        )
        .bind(learner_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(DbActivity::to_core).collect())
    }

    // === Quiz Repository ===

    async fn record_quiz_result(&self, learner_id: Uuid, result: &QuizResult) -> Result<QuizRecord> {
        let row = sqlx::query_as::<_, DbQuizResult>(
            r#"
            INSERT INTO quiz_results (learner_id, quiz_type, level, score, total_questions, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, quiz_type, level, score, total_questions, completed_at
            "#,
        )
        .bind(learner_id)
        .bind(result.quiz_type.as_str())
        .bind(&result.level)
        .bind(to_i32(result.score, "score")?)
        .bind(to_i32(result.total_questions, "total_questions")?)
        .bind(result.completed_at)
        .fetch_one(&self.pool)
        .await?;

        row.to_record()
    }

    async fn list_quiz_results(&self, learner_id: Uuid, limit: u32) -> Result<Vec<QuizRecord>> {
        let rows = sqlx::query_as::<_, DbQuizResult>(
            r#"
            SELECT id, quiz_type, level, score, total_questions, completed_at
            FROM quiz_results
            WHERE learner_id = $1
            ORDER BY completed_at DESC
            LIMIT $2
            "#,
        )
        .bind(learner_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(DbQuizResult::to_record).collect()
    }
}
