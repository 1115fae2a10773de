//! Repository for the `user_topic_progress` table.

use bilim_core::mastery::MasteryTier;
use bilim_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::topic_progress::{TopicWithProgress, UserTopicProgress};

/// Column list for `user_topic_progress` queries.
const COLUMNS: &str = "\
    id, user_id, topic_id, mastery, progress_percent, last_practiced_at, \
    created_at, updated_at";

/// Provides data access for per-topic mastery.
pub struct TopicProgressRepo;

impl TopicProgressRepo {
    /// Insert or overwrite the learner's mastery on a topic.
    pub async fn upsert<'e, E>(
        executor: E,
        user_id: DbId,
        topic_id: DbId,
        mastery: MasteryTier,
        progress_percent: i32,
    ) -> Result<UserTopicProgress, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO user_topic_progress \
                 (user_id, topic_id, mastery, progress_percent, last_practiced_at) \
             VALUES ($1, $2, $3, $4, NOW()) \
             ON CONFLICT (user_id, topic_id) DO UPDATE SET \
                 mastery = EXCLUDED.mastery, \
                 progress_percent = EXCLUDED.progress_percent, \
                 last_practiced_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserTopicProgress>(&query)
            .bind(user_id)
            .bind(topic_id)
            .bind(mastery.as_str())
            .bind(progress_percent)
            .fetch_one(executor)
            .await
    }

    pub async fn count_mastered<'e, E>(executor: E, user_id: DbId) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM user_topic_progress \
             WHERE user_id = $1 AND mastery = $2",
        )
        .bind(user_id)
        .bind(MasteryTier::Mastered.as_str())
        .fetch_one(executor)
        .await?;
        Ok(row.0)
    }

    /// Every topic (optionally of one subject) with the learner's progress
    /// left-joined, ordered by subject and `order_index`.
    pub async fn list_with_topics(
        pool: &PgPool,
        user_id: DbId,
        subject: Option<&str>,
    ) -> Result<Vec<TopicWithProgress>, sqlx::Error> {
        sqlx::query_as::<_, TopicWithProgress>(
            "SELECT t.id AS topic_id, t.subject, t.title, t.title_local, t.order_index, \
                    p.mastery, p.progress_percent, p.last_practiced_at \
             FROM topics t \
             LEFT JOIN user_topic_progress p \
                 ON p.topic_id = t.id AND p.user_id = $1 \
             WHERE $2::text IS NULL OR t.subject = $2 \
             ORDER BY t.subject, t.order_index, t.id",
        )
        .bind(user_id)
        .bind(subject)
        .fetch_all(pool)
        .await
    }
}
