//! Lesson completion models and DTOs.

use bilim_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `user_lesson_progress` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserLessonProgress {
    pub id: DbId,
    pub user_id: DbId,
    pub lesson_id: DbId,
    pub completed: bool,
    pub progress_percent: i32,
    pub time_spent_seconds: i32,
    pub quiz_score: Option<i32>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for marking a lesson complete.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompleteLesson {
    #[serde(default)]
    pub time_spent_seconds: i32,
    pub quiz_score: Option<i32>,
}
