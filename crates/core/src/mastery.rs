//! Topic mastery tiers derived from the latest test score on a topic.
//!
//! Tier names must match the `user_topic_progress.mastery` column values.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Minimum score for [`MasteryTier::Mastered`].
pub const MASTERED_MIN_SCORE: i32 = 80;

/// Minimum score for [`MasteryTier::InProgress`].
pub const IN_PROGRESS_MIN_SCORE: i32 = 50;

/// Label reported for topics the learner has never been tested on.
pub const NOT_ATTEMPTED: &str = "not_attempted";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryTier {
    Weak,
    InProgress,
    Mastered,
}

impl MasteryTier {
    /// `>= 80` mastered, `>= 50` in progress, anything lower weak.
    pub fn from_score(score: i32) -> Self {
        if score >= MASTERED_MIN_SCORE {
            Self::Mastered
        } else if score >= IN_PROGRESS_MIN_SCORE {
            Self::InProgress
        } else {
            Self::Weak
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::InProgress => "in_progress",
            Self::Mastered => "mastered",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "weak" => Ok(Self::Weak),
            "in_progress" => Ok(Self::InProgress),
            "mastered" => Ok(Self::Mastered),
            other => Err(CoreError::Validation(format!(
                "Unknown mastery tier '{other}'"
            ))),
        }
    }
}
