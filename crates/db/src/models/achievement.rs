//! Unlocked achievement rows.

use bilim_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `user_achievements` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserAchievement {
    pub id: DbId,
    pub user_id: DbId,
    pub achievement: String,
    pub points_awarded: i64,
    pub unlocked_at: Timestamp,
}
