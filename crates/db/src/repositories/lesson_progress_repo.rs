//! Repository for the `user_lesson_progress` table.

use bilim_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::lesson_progress::{CompleteLesson, UserLessonProgress};

/// Column list for `user_lesson_progress` queries.
const COLUMNS: &str = "\
    id, user_id, lesson_id, completed, progress_percent, time_spent_seconds, \
    quiz_score, completed_at, created_at, updated_at";

/// Provides data access for lesson completion state.
pub struct LessonProgressRepo;

impl LessonProgressRepo {
    pub async fn find<'e, E>(
        executor: E,
        user_id: DbId,
        lesson_id: DbId,
    ) -> Result<Option<UserLessonProgress>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM user_lesson_progress \
             WHERE user_id = $1 AND lesson_id = $2"
        );
        sqlx::query_as::<_, UserLessonProgress>(&query)
            .bind(user_id)
            .bind(lesson_id)
            .fetch_optional(executor)
            .await
    }

    /// Mark a lesson complete.
    ///
    /// Repeated completions accumulate time spent (saturating at the column
    /// maximum), keep the first `completed_at`, and keep the previous quiz
    /// score when none is given.
    pub async fn complete<'e, E>(
        executor: E,
        user_id: DbId,
        lesson_id: DbId,
        dto: &CompleteLesson,
    ) -> Result<UserLessonProgress, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO user_lesson_progress \
                 (user_id, lesson_id, completed, progress_percent, time_spent_seconds, \
                  quiz_score, completed_at) \
             VALUES ($1, $2, TRUE, 100, $3, $4, NOW()) \
             ON CONFLICT (user_id, lesson_id) DO UPDATE SET \
                 completed = TRUE, \
                 progress_percent = 100, \
                 time_spent_seconds = LEAST( \
                     user_lesson_progress.time_spent_seconds::BIGINT + EXCLUDED.time_spent_seconds, \
                     2147483647)::INTEGER, \
                 quiz_score = COALESCE(EXCLUDED.quiz_score, user_lesson_progress.quiz_score), \
                 completed_at = COALESCE(user_lesson_progress.completed_at, NOW()) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserLessonProgress>(&query)
            .bind(user_id)
            .bind(lesson_id)
            .bind(dto.time_spent_seconds)
            .bind(dto.quiz_score)
            .fetch_one(executor)
            .await
    }

    pub async fn count_completed<'e, E>(executor: E, user_id: DbId) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM user_lesson_progress WHERE user_id = $1 AND completed",
        )
        .bind(user_id)
        .fetch_one(executor)
        .await?;
        Ok(row.0)
    }

    /// Total seconds spent in lessons.
    pub async fn total_time_seconds<'e, E>(executor: E, user_id: DbId) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let row: (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(time_spent_seconds), 0)::BIGINT \
             FROM user_lesson_progress WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(executor)
        .await?;
        Ok(row.0)
    }
}
