//! Gamification ledger.
//!
//! Applies one learner activity to the profile: streak, points, level,
//! achievements, and topic mastery. Everything runs in one transaction with
//! the profile row locked, so concurrent activities for the same learner are
//! serialized and a failure leaves nothing half-written. Celebration events
//! are published only after the transaction commits.

use bilim_core::achievements::{
    mastery_achievements, qualifying_achievements, AchievementContext, AchievementKind,
};
use bilim_core::celebration::CelebrationKind;
use bilim_core::error::CoreError;
use bilim_core::gamification::{
    apply_activity, learner_local_time, level_for_points, ActivityUpdate, LearnerClock,
    STREAK_MILESTONES,
};
use bilim_core::mastery::MasteryTier;
use bilim_core::types::DbId;
use bilim_db::repositories::{
    AchievementRepo, LessonProgressRepo, ProfileRepo, TopicProgressRepo, TopicRepo, UserTestRepo,
};
use bilim_db::DbPool;
use bilim_events::{EventBus, GamificationEvent};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgConnection;

use crate::error::AppResult;

/// An achievement unlocked by this activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AwardedAchievement {
    pub kind: AchievementKind,
    pub title: &'static str,
    pub points: i64,
}

/// Mastery written for the activity's topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MasteryUpdate {
    pub topic_id: DbId,
    pub mastery: MasteryTier,
    pub progress_percent: i32,
}

/// Result of one ledger run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerOutcome {
    pub streak: i32,
    pub previous_streak: i32,
    /// Point total including achievement bonuses.
    pub points: i64,
    pub points_earned: i64,
    pub bonus_points: i64,
    pub level: i32,
    pub previous_level: i32,
    pub last_activity_date: NaiveDate,
    pub new_achievements: Vec<AwardedAchievement>,
    pub mastery: Option<MasteryUpdate>,
}

impl LedgerOutcome {
    pub fn leveled_up(&self) -> bool {
        self.level > self.previous_level
    }

    /// The streak milestone reached by this activity, if any.
    pub fn streak_milestone(&self) -> Option<i32> {
        if self.streak == self.previous_streak {
            return None;
        }
        STREAK_MILESTONES
            .iter()
            .map(|(days, _)| *days)
            .find(|days| *days == self.streak)
    }
}

/// Run the ledger in its own transaction and publish the resulting events.
pub async fn record_activity(
    pool: &DbPool,
    bus: &EventBus,
    user_id: DbId,
    update: &ActivityUpdate,
) -> AppResult<LedgerOutcome> {
    let mut tx = pool.begin().await?;
    let outcome = apply_in_tx(&mut tx, user_id, update, Utc::now()).await?;
    tx.commit().await?;

    publish(bus, user_id, update, &outcome);
    Ok(outcome)
}

/// Apply `update` inside the caller's transaction.
///
/// The caller commits and then calls [`publish`]. `now` is the instant the
/// learner's local date and hour are derived from.
pub async fn apply_in_tx(
    conn: &mut PgConnection,
    user_id: DbId,
    update: &ActivityUpdate,
    now: DateTime<Utc>,
) -> AppResult<LedgerOutcome> {
    update.validate()?;
    let clock = LearnerClock::from_local(learner_local_time(now, update.utc_offset_minutes)?);

    let profile = ProfileRepo::lock_by_user(&mut *conn, user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Profile", user_id))?;

    let mastery_target = match (update.topic_id, update.test_score) {
        (Some(topic_id), Some(score)) => {
            TopicRepo::find_by_id(&mut *conn, topic_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Topic", topic_id))?;
            Some((topic_id, score))
        }
        _ => None,
    };

    // Streak and the activity's own points.
    let applied = apply_activity(profile.counters(), update.points_earned, clock.today);

    // Activity achievements.
    let completed_lessons = if update.lesson_completed {
        LessonProgressRepo::count_completed(&mut *conn, user_id).await?
    } else {
        0
    };
    let completed_tests = if update.test_score.is_some() {
        UserTestRepo::count_for_user(&mut *conn, user_id).await?
    } else {
        0
    };
    let ctx = AchievementContext {
        lesson_completed: update.lesson_completed,
        completed_lessons,
        test_score: update.test_score,
        completed_tests,
        streak: applied.streak,
        local_hour: clock.hour,
    };

    let mut new_achievements = Vec::new();
    award(conn, user_id, &qualifying_achievements(&ctx), &mut new_achievements).await?;

    // Topic mastery, then the mastery-count achievements it may unlock.
    let mastery = match mastery_target {
        Some((topic_id, score)) => {
            let tier = MasteryTier::from_score(score);
            TopicProgressRepo::upsert(&mut *conn, user_id, topic_id, tier, score).await?;
            let mastered = TopicProgressRepo::count_mastered(&mut *conn, user_id).await?;
            award(conn, user_id, &mastery_achievements(mastered), &mut new_achievements).await?;
            Some(MasteryUpdate {
                topic_id,
                mastery: tier,
                progress_percent: score,
            })
        }
        None => None,
    };

    let bonus_points: i64 = new_achievements.iter().map(|a| a.points).sum();
    let points = applied.points.saturating_add(bonus_points);
    let level = level_for_points(points);

    ProfileRepo::update_counters(
        &mut *conn,
        user_id,
        points,
        level,
        applied.streak,
        applied.last_activity_date,
    )
    .await?;

    tracing::info!(
        user_id,
        points,
        level,
        streak = applied.streak,
        achievements = new_achievements.len(),
        "Ledger updated",
    );

    Ok(LedgerOutcome {
        streak: applied.streak,
        previous_streak: applied.previous_streak,
        points,
        points_earned: update.points_earned,
        bonus_points,
        level,
        previous_level: applied.previous_level,
        last_activity_date: applied.last_activity_date,
        new_achievements,
        mastery,
    })
}

/// Insert each achievement the learner does not have yet, collecting the
/// ones actually inserted.
async fn award(
    conn: &mut PgConnection,
    user_id: DbId,
    kinds: &[AchievementKind],
    awarded: &mut Vec<AwardedAchievement>,
) -> AppResult<()> {
    for kind in kinds {
        let inserted =
            AchievementRepo::insert_if_absent(&mut *conn, user_id, kind.as_str(), kind.points())
                .await?;
        if inserted {
            awarded.push(AwardedAchievement {
                kind: *kind,
                title: kind.title(),
                points: kind.points(),
            });
        }
    }
    Ok(())
}

/// Build the celebration events for an outcome, in display order.
pub fn celebration_events(
    user_id: DbId,
    update: &ActivityUpdate,
    outcome: &LedgerOutcome,
) -> Vec<GamificationEvent> {
    let mut events = Vec::new();

    if update.lesson_completed {
        events.push(GamificationEvent::new(
            CelebrationKind::LessonCompleted,
            user_id,
            "Lesson complete. Keep going!",
        ));
    }

    if let Some(score) = update.test_score {
        events.push(
            GamificationEvent::new(
                CelebrationKind::TestCompleted,
                user_id,
                format!("You scored {score}%"),
            )
            .with_payload(serde_json::json!({ "score": score })),
        );
        if score == 100 {
            events.push(GamificationEvent::new(
                CelebrationKind::PerfectScore,
                user_id,
                "Every answer correct!",
            ));
        }
    }

    if outcome.points_earned > 0 {
        events.push(
            GamificationEvent::new(
                CelebrationKind::PointsEarned,
                user_id,
                format!("+{} points", outcome.points_earned),
            )
            .with_points(outcome.points_earned),
        );
    }

    if let Some(days) = outcome.streak_milestone() {
        events.push(
            GamificationEvent::new(
                CelebrationKind::StreakMilestone,
                user_id,
                format!("{days} days in a row!"),
            )
            .with_payload(serde_json::json!({ "streak": days })),
        );
    }

    for achievement in &outcome.new_achievements {
        events.push(
            GamificationEvent::new(
                CelebrationKind::AchievementUnlocked,
                user_id,
                achievement.kind.description(),
            )
            .with_title(achievement.title)
            .with_points(achievement.points)
            .with_payload(serde_json::json!({ "achievement": achievement.kind })),
        );
    }

    if outcome.leveled_up() {
        events.push(
            GamificationEvent::new(
                CelebrationKind::LevelUp,
                user_id,
                format!("You reached level {}", outcome.level),
            )
            .with_payload(serde_json::json!({
                "level": outcome.level,
                "previous_level": outcome.previous_level,
            })),
        );
    }

    events
}

/// Publish the celebration events for a committed outcome.
pub fn publish(bus: &EventBus, user_id: DbId, update: &ActivityUpdate, outcome: &LedgerOutcome) {
    for event in celebration_events(user_id, update, outcome) {
        bus.publish(event);
    }
}
