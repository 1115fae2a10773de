//! Repository for the `user_tests` table.

use bilim_core::scoring::average_score;
use bilim_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::user_test::{CreateUserTest, LearnerTotals, UserTest};
use crate::repositories::LessonProgressRepo;

/// Column list for `user_tests` queries.
const COLUMNS: &str = "\
    id, user_id, topic_id, title, score, correct_count, total_questions, \
    time_taken_seconds, topic_performance, completed_at";

/// Provides data access for test attempts.
pub struct UserTestRepo;

impl UserTestRepo {
    pub async fn create<'e, E>(
        executor: E,
        user_id: DbId,
        dto: &CreateUserTest,
    ) -> Result<UserTest, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO user_tests \
                 (user_id, topic_id, title, score, correct_count, total_questions, \
                  time_taken_seconds, topic_performance) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserTest>(&query)
            .bind(user_id)
            .bind(dto.topic_id)
            .bind(&dto.title)
            .bind(dto.score)
            .bind(dto.correct_count)
            .bind(dto.total_questions)
            .bind(dto.time_taken_seconds)
            .bind(&dto.topic_performance)
            .fetch_one(executor)
            .await
    }

    /// Find an attempt belonging to `user_id`.
    pub async fn find_for_user(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<UserTest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_tests WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, UserTest>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Most recent attempts first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserTest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_tests \
             WHERE user_id = $1 \
             ORDER BY completed_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, UserTest>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_user<'e, E>(executor: E, user_id: DbId) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_tests WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }

    /// Aggregate test and lesson counters for the statistics view.
    pub async fn learner_totals(pool: &PgPool, user_id: DbId) -> Result<LearnerTotals, sqlx::Error> {
        let (tests_completed, score_sum, test_time): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COALESCE(SUM(score), 0)::BIGINT, \
                    COALESCE(SUM(time_taken_seconds), 0)::BIGINT \
             FROM user_tests WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        let lessons_completed = LessonProgressRepo::count_completed(pool, user_id).await?;
        let lesson_time = LessonProgressRepo::total_time_seconds(pool, user_id).await?;

        Ok(LearnerTotals {
            tests_completed,
            lessons_completed,
            study_time_seconds: test_time + lesson_time,
            average_score: average_score(score_sum, tests_completed),
        })
    }
}
