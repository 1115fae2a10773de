//! Repository for the `user_achievements` table.

use bilim_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::achievement::UserAchievement;

/// Column list for `user_achievements` queries.
const COLUMNS: &str = "id, user_id, achievement, points_awarded, unlocked_at";

/// Provides data access for unlocked achievements.
pub struct AchievementRepo;

impl AchievementRepo {
    /// Record an achievement unless the user already has it.
    ///
    /// Returns `true` only when a row was inserted, which is the signal for
    /// the caller to credit the bonus.
    pub async fn insert_if_absent<'e, E>(
        executor: E,
        user_id: DbId,
        achievement: &str,
        points_awarded: i64,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "INSERT INTO user_achievements (user_id, achievement, points_awarded) \
             VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_user_achievements_user_kind DO NOTHING",
        )
        .bind(user_id)
        .bind(achievement)
        .bind(points_awarded)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All achievements a user has unlocked, oldest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<UserAchievement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_achievements \
             WHERE user_id = $1 \
             ORDER BY unlocked_at, id"
        );
        sqlx::query_as::<_, UserAchievement>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
