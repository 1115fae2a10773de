//! Achievement kinds, their point values, and the unlock conditions the
//! ledger evaluates after every activity.
//!
//! Kind names must match the `user_achievements.achievement` column values.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Hours (local time, inclusive) that count as "early bird".
pub const EARLY_BIRD_HOURS: std::ops::RangeInclusive<u32> = 5..=7;

/// Local hour at or after which an activity counts as "night owl".
pub const NIGHT_OWL_FROM_HOUR: u32 = 22;

/// Local hour at or before which an activity counts as "night owl".
pub const NIGHT_OWL_UNTIL_HOUR: u32 = 2;

/// Every achievement a learner can unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    FirstLesson,
    FirstTest,
    #[serde(rename = "streak_3")]
    Streak3,
    #[serde(rename = "streak_7")]
    Streak7,
    #[serde(rename = "streak_30")]
    Streak30,
    #[serde(rename = "mastery_5")]
    Mastery5,
    #[serde(rename = "mastery_10")]
    Mastery10,
    PerfectScore,
    EarlyBird,
    NightOwl,
}

impl AchievementKind {
    pub const ALL: [AchievementKind; 10] = [
        Self::FirstLesson,
        Self::FirstTest,
        Self::Streak3,
        Self::Streak7,
        Self::Streak30,
        Self::Mastery5,
        Self::Mastery10,
        Self::PerfectScore,
        Self::EarlyBird,
        Self::NightOwl,
    ];

    /// Database value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstLesson => "first_lesson",
            Self::FirstTest => "first_test",
            Self::Streak3 => "streak_3",
            Self::Streak7 => "streak_7",
            Self::Streak30 => "streak_30",
            Self::Mastery5 => "mastery_5",
            Self::Mastery10 => "mastery_10",
            Self::PerfectScore => "perfect_score",
            Self::EarlyBird => "early_bird",
            Self::NightOwl => "night_owl",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| CoreError::Validation(format!("Unknown achievement '{name}'")))
    }

    /// Bonus points credited to the profile when the achievement unlocks.
    pub fn points(self) -> i64 {
        match self {
            Self::FirstLesson | Self::FirstTest => 50,
            Self::Streak3 => 100,
            Self::Streak7 => 200,
            Self::Streak30 => 500,
            Self::Mastery5 => 150,
            Self::Mastery10 => 300,
            Self::PerfectScore => 100,
            Self::EarlyBird | Self::NightOwl => 25,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::FirstLesson => "First lesson",
            Self::FirstTest => "First test",
            Self::Streak3 => "3-day streak",
            Self::Streak7 => "7-day streak",
            Self::Streak30 => "30-day streak",
            Self::Mastery5 => "Five topics mastered",
            Self::Mastery10 => "Ten topics mastered",
            Self::PerfectScore => "Perfect score",
            Self::EarlyBird => "Early bird",
            Self::NightOwl => "Night owl",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::FirstLesson => "Complete your first lesson",
            Self::FirstTest => "Complete your first test",
            Self::Streak3 => "Study 3 days in a row",
            Self::Streak7 => "Study 7 days in a row",
            Self::Streak30 => "Study 30 days in a row",
            Self::Mastery5 => "Master 5 topics",
            Self::Mastery10 => "Master 10 topics",
            Self::PerfectScore => "Score 100% on a test",
            Self::EarlyBird => "Study between 5 and 8 in the morning",
            Self::NightOwl => "Study between 10 at night and 3 in the morning",
        }
    }

    /// Required streak length for streak kinds.
    pub fn streak_target(self) -> Option<i32> {
        match self {
            Self::Streak3 => Some(3),
            Self::Streak7 => Some(7),
            Self::Streak30 => Some(30),
            _ => None,
        }
    }

    /// Required number of mastered topics for mastery kinds.
    pub fn mastery_target(self) -> Option<i64> {
        match self {
            Self::Mastery5 => Some(5),
            Self::Mastery10 => Some(10),
            _ => None,
        }
    }

    /// Percent progress towards a streak or mastery target, `None` for
    /// one-shot kinds.
    pub fn progress_percent(self, streak: i32, mastered_topics: i64) -> Option<i64> {
        let (current, target) = match (self.streak_target(), self.mastery_target()) {
            (Some(target), _) => (i64::from(streak.max(0)), i64::from(target)),
            (_, Some(target)) => (mastered_topics.max(0), target),
            _ => return None,
        };
        Some((current * 100 / target).min(100))
    }
}

impl std::fmt::Display for AchievementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State the activity achievements are evaluated against.
///
/// The lesson/test counts are the store counts *after* the current
/// activity was recorded, so `1` means "this was the first one".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AchievementContext {
    pub lesson_completed: bool,
    pub completed_lessons: i64,
    pub test_score: Option<i32>,
    pub completed_tests: i64,
    pub streak: i32,
    pub local_hour: u32,
}

/// Evaluate the fixed activity condition list, in award order.
pub fn qualifying_achievements(ctx: &AchievementContext) -> Vec<AchievementKind> {
    let mut kinds = Vec::new();

    if ctx.lesson_completed && ctx.completed_lessons == 1 {
        kinds.push(AchievementKind::FirstLesson);
    }

    if let Some(score) = ctx.test_score {
        if ctx.completed_tests == 1 {
            kinds.push(AchievementKind::FirstTest);
        }
        if score == 100 {
            kinds.push(AchievementKind::PerfectScore);
        }
    }

    for kind in [
        AchievementKind::Streak3,
        AchievementKind::Streak7,
        AchievementKind::Streak30,
    ] {
        if kind.streak_target().is_some_and(|target| ctx.streak >= target) {
            kinds.push(kind);
        }
    }

    if EARLY_BIRD_HOURS.contains(&ctx.local_hour) {
        kinds.push(AchievementKind::EarlyBird);
    }
    if ctx.local_hour >= NIGHT_OWL_FROM_HOUR || ctx.local_hour <= NIGHT_OWL_UNTIL_HOUR {
        kinds.push(AchievementKind::NightOwl);
    }

    kinds
}

/// Mastery achievements satisfied by `mastered_topics` mastered topics.
pub fn mastery_achievements(mastered_topics: i64) -> Vec<AchievementKind> {
    [AchievementKind::Mastery5, AchievementKind::Mastery10]
        .into_iter()
        .filter(|kind| {
            kind.mastery_target()
                .is_some_and(|target| mastered_topics >= target)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn midday() -> AchievementContext {
        AchievementContext {
            local_hour: 12,
            streak: 1,
            ..Default::default()
        }
    }

    #[test]
    fn names_round_trip_through_from_name() {
        for kind in AchievementKind::ALL {
            assert_eq!(AchievementKind::from_name(kind.as_str()).unwrap(), kind);
        }
        assert!(AchievementKind::from_name("streak_100").is_err());
    }

    #[test]
    fn serde_names_match_database_values() {
        for kind in AchievementKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.as_str());
        }
    }

    #[test]
    fn point_table() {
        assert_eq!(AchievementKind::FirstLesson.points(), 50);
        assert_eq!(AchievementKind::Streak7.points(), 200);
        assert_eq!(AchievementKind::Streak30.points(), 500);
        assert_eq!(AchievementKind::Mastery10.points(), 300);
        assert_eq!(AchievementKind::NightOwl.points(), 25);
    }

    #[test]
    fn first_lesson_only_when_count_is_one() {
        let first = AchievementContext {
            lesson_completed: true,
            completed_lessons: 1,
            ..midday()
        };
        assert_eq!(qualifying_achievements(&first), vec![AchievementKind::FirstLesson]);

        let second = AchievementContext {
            completed_lessons: 2,
            ..first
        };
        assert!(qualifying_achievements(&second).is_empty());
    }

    #[test]
    fn test_achievements_require_a_score() {
        let perfect_first = AchievementContext {
            test_score: Some(100),
            completed_tests: 1,
            ..midday()
        };
        assert_eq!(
            qualifying_achievements(&perfect_first),
            vec![AchievementKind::FirstTest, AchievementKind::PerfectScore]
        );

        let no_score = AchievementContext {
            completed_tests: 1,
            ..midday()
        };
        assert!(qualifying_achievements(&no_score).is_empty());
    }

    #[test]
    fn streak_thresholds_are_cumulative() {
        let ctx = AchievementContext {
            streak: 7,
            ..midday()
        };
        assert_eq!(
            qualifying_achievements(&ctx),
            vec![AchievementKind::Streak3, AchievementKind::Streak7]
        );
    }

    #[test]
    fn time_of_day_windows() {
        let at = |hour| AchievementContext {
            local_hour: hour,
            ..Default::default()
        };
        assert_eq!(qualifying_achievements(&at(4)), vec![]);
        assert_eq!(qualifying_achievements(&at(5)), vec![AchievementKind::EarlyBird]);
        assert_eq!(qualifying_achievements(&at(7)), vec![AchievementKind::EarlyBird]);
        assert_eq!(qualifying_achievements(&at(8)), vec![]);
        assert_eq!(qualifying_achievements(&at(21)), vec![]);
        assert_eq!(qualifying_achievements(&at(22)), vec![AchievementKind::NightOwl]);
        assert_eq!(qualifying_achievements(&at(0)), vec![AchievementKind::NightOwl]);
        assert_eq!(qualifying_achievements(&at(2)), vec![AchievementKind::NightOwl]);
        assert_eq!(qualifying_achievements(&at(3)), vec![]);
    }

    #[test]
    fn mastery_thresholds() {
        assert!(mastery_achievements(4).is_empty());
        assert_eq!(mastery_achievements(5), vec![AchievementKind::Mastery5]);
        assert_eq!(
            mastery_achievements(12),
            vec![AchievementKind::Mastery5, AchievementKind::Mastery10]
        );
    }

    #[test]
    fn progress_percent_caps_at_100() {
        assert_eq!(AchievementKind::Streak7.progress_percent(3, 0), Some(42));
        assert_eq!(AchievementKind::Streak3.progress_percent(9, 0), Some(100));
        assert_eq!(AchievementKind::Mastery10.progress_percent(0, 5), Some(50));
        assert_eq!(AchievementKind::PerfectScore.progress_percent(9, 9), None);
    }
}
