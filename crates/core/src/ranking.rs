//! Leaderboard ranking rules.
//!
//! Ranks are "competition" ranks: a learner's rank is one more than the
//! number of learners with strictly more points, so equal totals share a
//! rank. The order of tied entries within a listing is whatever order the
//! store returns and is not guaranteed.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default number of leaderboard entries.
pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;

/// Maximum number of leaderboard entries per request.
pub const MAX_LEADERBOARD_LIMIT: i64 = 100;

/// Activity window for the weekly leaderboard, in days.
pub const WEEKLY_WINDOW_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardPeriod {
    #[default]
    AllTime,
    /// Only learners active within the last [`WEEKLY_WINDOW_DAYS`].
    Weekly,
}

impl LeaderboardPeriod {
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "all_time" => Ok(Self::AllTime),
            "weekly" => Ok(Self::Weekly),
            other => Err(CoreError::Validation(format!(
                "Unknown leaderboard period '{other}'. Must be one of: all_time, weekly"
            ))),
        }
    }

    /// Earliest last-activity date inside the period, `None` for all time.
    ///
    /// The weekly window is today plus the six days before it.
    pub fn active_since(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::AllTime => None,
            Self::Weekly => today.checked_sub_days(Days::new(WEEKLY_WINDOW_DAYS - 1)),
        }
    }
}

/// Clamp a requested page size into `1..=MAX_LEADERBOARD_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, MAX_LEADERBOARD_LIMIT)
}

/// One more than the number of totals strictly greater than `points`.
pub fn competition_rank(points: i64, all_points: impl IntoIterator<Item = i64>) -> i64 {
    1 + all_points.into_iter().filter(|p| *p > points).count() as i64
}

/// Assign competition ranks to a list already sorted by points descending.
///
/// `points_of` extracts the total from each entry.
pub fn assign_ranks<T>(sorted: &[T], points_of: impl Fn(&T) -> i64) -> Vec<i64> {
    let mut ranks = Vec::with_capacity(sorted.len());
    for (i, entry) in sorted.iter().enumerate() {
        let rank = match i.checked_sub(1) {
            Some(prev) if points_of(&sorted[prev]) == points_of(entry) => ranks[prev],
            _ => i as i64 + 1,
        };
        ranks.push(rank);
    }
    ranks
}
