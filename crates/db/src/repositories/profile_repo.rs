//! Repository for the `profiles` table.

use bilim_core::types::DbId;
use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool};

use crate::models::profile::{EnsureProfile, LeaderboardRow, Profile};

/// Column list for `profiles` queries.
const COLUMNS: &str = "\
    id, user_id, display_name, avatar_url, points, level, streak, \
    last_activity_date, created_at, updated_at";

/// Provides data access for learner profiles.
pub struct ProfileRepo;

impl ProfileRepo {
    /// Find the profile for a user.
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE user_id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Create the profile if missing.
    ///
    /// Uses `ON CONFLICT (user_id) DO UPDATE` so an existing profile keeps
    /// its counters and only the provided display fields change.
    pub async fn ensure(
        pool: &PgPool,
        user_id: DbId,
        dto: &EnsureProfile,
    ) -> Result<Profile, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles (user_id, display_name, avatar_url) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 display_name = COALESCE($2, profiles.display_name), \
                 avatar_url = COALESCE($3, profiles.avatar_url) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .bind(&dto.display_name)
            .bind(&dto.avatar_url)
            .fetch_one(pool)
            .await
    }

    /// Read the profile and take a row lock held until the surrounding
    /// transaction ends.
    pub async fn lock_by_user<'e, E>(
        executor: E,
        user_id: DbId,
    ) -> Result<Option<Profile>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE user_id = $1 FOR UPDATE");
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .fetch_optional(executor)
            .await
    }

    /// Overwrite the gamification counters in a single statement.
    pub async fn update_counters<'e, E>(
        executor: E,
        user_id: DbId,
        points: i64,
        level: i32,
        streak: i32,
        last_activity_date: NaiveDate,
    ) -> Result<Profile, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE profiles SET \
                 points = $2, level = $3, streak = $4, last_activity_date = $5 \
             WHERE user_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .bind(points)
            .bind(level)
            .bind(streak)
            .bind(last_activity_date)
            .fetch_one(executor)
            .await
    }

    /// Top profiles by points, optionally restricted to those active on or
    /// after `active_since`.
    ///
    /// The `limit` should already be clamped by the caller.
    pub async fn leaderboard(
        pool: &PgPool,
        active_since: Option<NaiveDate>,
        limit: i64,
    ) -> Result<Vec<LeaderboardRow>, sqlx::Error> {
        sqlx::query_as::<_, LeaderboardRow>(
            "SELECT user_id, display_name, avatar_url, points, level, streak \
             FROM profiles \
             WHERE $1::date IS NULL OR last_activity_date >= $1 \
             ORDER BY points DESC \
             LIMIT $2",
        )
        .bind(active_since)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Number of profiles (in the same population as [`Self::leaderboard`])
    /// with strictly more points than `points`.
    pub async fn count_with_more_points(
        pool: &PgPool,
        points: i64,
        active_since: Option<NaiveDate>,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM profiles \
             WHERE points > $1 \
               AND ($2::date IS NULL OR last_activity_date >= $2)",
        )
        .bind(points)
        .bind(active_since)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
