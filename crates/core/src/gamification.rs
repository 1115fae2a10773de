//! Points, level, and streak arithmetic for the learner profile.
//!
//! These are the pure parts of the ledger update: given the stored profile
//! state and an incoming activity, compute the next state. Persistence and
//! achievement awarding live in the ledger engine (`bilim-api`).

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::achievements::AchievementKind;
use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Points required per level. Level 1 covers `0..500`, level 2 `500..1000`, ...
pub const POINTS_PER_LEVEL: i64 = 500;

/// Points granted for completing a lesson.
pub const LESSON_COMPLETION_POINTS: i64 = 50;

/// Upper bound on points a single activity may carry.
pub const MAX_POINTS_PER_ACTIVITY: i64 = 10_000;

/// Largest accepted UTC offset for a learner's local clock (UTC+14 / UTC-14).
pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Streak lengths that unlock an achievement, in ascending order.
pub const STREAK_MILESTONES: [(i32, AchievementKind); 3] = [
    (3, AchievementKind::Streak3),
    (7, AchievementKind::Streak7),
    (30, AchievementKind::Streak30),
];

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// Level for a point total: `floor(points / 500) + 1`.
///
/// Negative totals never occur in the store but are clamped to level 1.
pub fn level_for_points(points: i64) -> i32 {
    let levels = points.max(0) / POINTS_PER_LEVEL;
    i32::try_from(levels).unwrap_or(i32::MAX - 1) + 1
}

/// Progress through the current level, as shown on the XP bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct XpProgress {
    pub level: i32,
    pub points_in_level: i64,
    pub points_to_next_level: i64,
    /// Whole percent of the current level completed (0..=99).
    pub percent: i64,
}

impl XpProgress {
    pub fn for_points(points: i64) -> Self {
        let points = points.max(0);
        let points_in_level = points % POINTS_PER_LEVEL;
        Self {
            level: level_for_points(points),
            points_in_level,
            points_to_next_level: POINTS_PER_LEVEL - points_in_level,
            percent: points_in_level * 100 / POINTS_PER_LEVEL,
        }
    }
}

// ---------------------------------------------------------------------------
// Streak
// ---------------------------------------------------------------------------

/// Compute the streak after a qualifying action on `today`.
///
/// - last activity was yesterday: `current + 1`
/// - last activity was today: unchanged
/// - anything else (older, never, or a future date): reset to `1`
pub fn next_streak(current: i32, last_activity: Option<NaiveDate>, today: NaiveDate) -> i32 {
    match last_activity {
        Some(last) if last == today => current,
        Some(last) if today.pred_opt() == Some(last) => current.saturating_add(1),
        _ => 1,
    }
}

/// The next streak milestone the learner has not yet reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreakMilestone {
    pub days: i32,
    pub reward_points: i64,
    pub days_remaining: i32,
}

/// Find the first milestone strictly above `streak`, or `None` past 30 days.
pub fn next_streak_milestone(streak: i32) -> Option<StreakMilestone> {
    STREAK_MILESTONES
        .iter()
        .find(|(days, _)| *days > streak)
        .map(|(days, kind)| StreakMilestone {
            days: *days,
            reward_points: kind.points(),
            days_remaining: days - streak.max(0),
        })
}

// ---------------------------------------------------------------------------
// Activity
// ---------------------------------------------------------------------------

/// A learner action fed to the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ActivityUpdate {
    #[serde(default)]
    pub points_earned: i64,
    pub test_score: Option<i32>,
    #[serde(default)]
    pub lesson_completed: bool,
    pub topic_id: Option<DbId>,
    /// Learner's offset from UTC in minutes; decides "today" and the hour
    /// used for time-of-day achievements.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl ActivityUpdate {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(0..=MAX_POINTS_PER_ACTIVITY).contains(&self.points_earned) {
            return Err(CoreError::Validation(format!(
                "points_earned must be between 0 and {MAX_POINTS_PER_ACTIVITY}, got {}",
                self.points_earned
            )));
        }
        if let Some(score) = self.test_score {
            validate_score(score)?;
        }
        validate_utc_offset(self.utc_offset_minutes)?;
        Ok(())
    }
}

/// Test and quiz scores are whole percentages.
pub fn validate_score(score: i32) -> Result<(), CoreError> {
    if (0..=100).contains(&score) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "test_score must be between 0 and 100, got {score}"
        )))
    }
}

pub fn validate_utc_offset(minutes: i32) -> Result<(), CoreError> {
    if minutes.abs() <= MAX_UTC_OFFSET_MINUTES {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "utc_offset_minutes must be within +/-{MAX_UTC_OFFSET_MINUTES}, got {minutes}"
        )))
    }
}

/// Convert a UTC instant to the learner's wall clock.
pub fn learner_local_time(
    now: DateTime<Utc>,
    utc_offset_minutes: i32,
) -> Result<DateTime<FixedOffset>, CoreError> {
    validate_utc_offset(utc_offset_minutes)?;
    let offset = FixedOffset::east_opt(utc_offset_minutes * 60).ok_or_else(|| {
        CoreError::Validation(format!("Invalid UTC offset: {utc_offset_minutes} minutes"))
    })?;
    Ok(now.with_timezone(&offset))
}

/// The learner clock reading used by one ledger run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LearnerClock {
    pub today: NaiveDate,
    pub hour: u32,
}

impl LearnerClock {
    pub fn from_local(local: DateTime<FixedOffset>) -> Self {
        Self {
            today: local.date_naive(),
            hour: local.hour(),
        }
    }
}

/// Stored profile counters as read at the start of a ledger run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileCounters {
    pub points: i64,
    pub streak: i32,
    pub level: i32,
    pub last_activity_date: Option<NaiveDate>,
}

/// Profile counters after the activity's own points and the streak rule
/// have been applied (steps 2-3 of the ledger).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedActivity {
    pub points: i64,
    pub streak: i32,
    pub level: i32,
    pub previous_level: i32,
    pub previous_streak: i32,
    pub last_activity_date: NaiveDate,
}

pub fn apply_activity(
    current: ProfileCounters,
    points_earned: i64,
    today: NaiveDate,
) -> AppliedActivity {
    let points = current.points.saturating_add(points_earned.max(0));
    AppliedActivity {
        points,
        streak: next_streak(current.streak, current.last_activity_date, today),
        level: level_for_points(points),
        previous_level: current.level,
        previous_streak: current.streak,
        last_activity_date: today,
    }
}
