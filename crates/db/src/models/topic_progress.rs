//! Per-topic mastery models.

use bilim_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `user_topic_progress` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserTopicProgress {
    pub id: DbId,
    pub user_id: DbId,
    pub topic_id: DbId,
    pub mastery: String,
    pub progress_percent: i32,
    pub last_practiced_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A topic joined with the learner's progress on it, if any.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TopicWithProgress {
    pub topic_id: DbId,
    pub subject: String,
    pub title: String,
    pub title_local: Option<String>,
    pub order_index: i32,
    pub mastery: Option<String>,
    pub progress_percent: Option<i32>,
    pub last_practiced_at: Option<Timestamp>,
}
