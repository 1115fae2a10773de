//! Celebration kinds shown to the learner after gamification events.
//!
//! Each kind maps to a bus event type (`gamification.<kind>`) and to the
//! presentation hints the client uses for its toast.

use serde::{Deserialize, Serialize};

/// Prefix of every gamification event type on the bus.
pub const EVENT_PREFIX: &str = "gamification.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CelebrationKind {
    PointsEarned,
    StreakMilestone,
    LevelUp,
    AchievementUnlocked,
    LessonCompleted,
    TestCompleted,
    PerfectScore,
}

/// Client-facing hints for rendering a celebration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Presentation {
    pub icon: &'static str,
    pub color: &'static str,
    pub default_title: &'static str,
    pub confetti: bool,
}

impl CelebrationKind {
    pub const ALL: [CelebrationKind; 7] = [
        Self::PointsEarned,
        Self::StreakMilestone,
        Self::LevelUp,
        Self::AchievementUnlocked,
        Self::LessonCompleted,
        Self::TestCompleted,
        Self::PerfectScore,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PointsEarned => "points_earned",
            Self::StreakMilestone => "streak_milestone",
            Self::LevelUp => "level_up",
            Self::AchievementUnlocked => "achievement_unlocked",
            Self::LessonCompleted => "lesson_completed",
            Self::TestCompleted => "test_completed",
            Self::PerfectScore => "perfect_score",
        }
    }

    /// Event type published on the bus, e.g. `gamification.level_up`.
    pub fn event_type(self) -> String {
        format!("{EVENT_PREFIX}{}", self.as_str())
    }

    pub fn presentation(self) -> Presentation {
        let (icon, color, default_title) = match self {
            Self::PointsEarned => ("sparkles", "primary", "Points earned!"),
            Self::StreakMilestone => ("flame", "orange", "Streak milestone!"),
            Self::LevelUp => ("star", "yellow", "Level up!"),
            Self::AchievementUnlocked => ("trophy", "purple", "Achievement unlocked!"),
            Self::LessonCompleted => ("award", "green", "Lesson completed!"),
            Self::TestCompleted => ("zap", "blue", "Test completed!"),
            Self::PerfectScore => ("trophy", "yellow", "Perfect score!"),
        };
        Presentation {
            icon,
            color,
            default_title,
            confetti: matches!(
                self,
                Self::LevelUp | Self::AchievementUnlocked | Self::PerfectScore
            ),
        }
    }
}

impl std::fmt::Display for CelebrationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
