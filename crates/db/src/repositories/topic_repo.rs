//! Repository for the `topics` table.

use bilim_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::topic::{CreateTopic, Topic};

/// Column list for `topics` queries.
const COLUMNS: &str = "id, subject, title, title_local, order_index, created_at, updated_at";

/// Provides CRUD operations for the topic catalogue.
pub struct TopicRepo;

impl TopicRepo {
    pub async fn create(pool: &PgPool, dto: &CreateTopic) -> Result<Topic, sqlx::Error> {
        let query = format!(
            "INSERT INTO topics (subject, title, title_local, order_index) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Topic>(&query)
            .bind(&dto.subject)
            .bind(&dto.title)
            .bind(&dto.title_local)
            .bind(dto.order_index)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<Topic>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM topics WHERE id = $1");
        sqlx::query_as::<_, Topic>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List topics ordered by subject then `order_index`, optionally for a
    /// single subject.
    pub async fn list(pool: &PgPool, subject: Option<&str>) -> Result<Vec<Topic>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM topics \
             WHERE $1::text IS NULL OR subject = $1 \
             ORDER BY subject, order_index, id"
        );
        sqlx::query_as::<_, Topic>(&query)
            .bind(subject)
            .fetch_all(pool)
            .await
    }
}
