//! Achievements catalogue for the current learner.

use std::collections::HashMap;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use bilim_core::achievements::AchievementKind;
use bilim_core::types::Timestamp;
use bilim_db::repositories::{AchievementRepo, ProfileRepo, TopicProgressRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// One catalogue entry, locked or unlocked.
#[derive(Debug, Serialize)]
pub struct AchievementEntry {
    pub kind: AchievementKind,
    pub title: &'static str,
    pub description: &'static str,
    pub points: i64,
    pub unlocked: bool,
    pub unlocked_at: Option<Timestamp>,
    /// Progress towards streak and mastery targets; `null` for one-shot kinds.
    pub progress_percent: Option<i64>,
}

/// GET /api/v1/me/achievements
///
/// Every achievement kind with the caller's unlock state. Works without a
/// profile (nothing unlocked, zero progress).
pub async fn list_achievements(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let unlocked: HashMap<String, Timestamp> =
        AchievementRepo::list_for_user(&state.pool, user.user_id)
            .await?
            .into_iter()
            .map(|a| (a.achievement, a.unlocked_at))
            .collect();
    let streak = ProfileRepo::find_by_user(&state.pool, user.user_id)
        .await?
        .map_or(0, |p| p.streak);
    let mastered = TopicProgressRepo::count_mastered(&state.pool, user.user_id).await?;

    let entries: Vec<AchievementEntry> = AchievementKind::ALL
        .into_iter()
        .map(|kind| {
            let unlocked_at = unlocked.get(kind.as_str()).copied();
            AchievementEntry {
                kind,
                title: kind.title(),
                description: kind.description(),
                points: kind.points(),
                unlocked: unlocked_at.is_some(),
                unlocked_at,
                progress_percent: if unlocked_at.is_some() {
                    kind.progress_percent(streak, mastered).map(|_| 100)
                } else {
                    kind.progress_percent(streak, mastered)
                },
            }
        })
        .collect();

    Ok(Json(DataResponse { data: entries }))
}
