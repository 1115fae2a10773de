//! Learner profile models.

use bilim_core::gamification::ProfileCounters;
use bilim_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub id: DbId,
    pub user_id: DbId,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub points: i64,
    pub level: i32,
    pub streak: i32,
    pub last_activity_date: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Profile {
    pub fn counters(&self) -> ProfileCounters {
        ProfileCounters {
            points: self.points,
            streak: self.streak,
            level: self.level,
            last_activity_date: self.last_activity_date,
        }
    }
}

/// A leaderboard projection of `profiles`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeaderboardRow {
    pub user_id: DbId,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub points: i64,
    pub level: i32,
    pub streak: i32,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for creating a profile. Existing profiles keep their counters; only
/// the provided display fields are refreshed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnsureProfile {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}
