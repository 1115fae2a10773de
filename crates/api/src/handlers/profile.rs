//! Handlers for the learner's own profile.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use bilim_core::error::CoreError;
use bilim_core::gamification::{next_streak_milestone, StreakMilestone, XpProgress};
use bilim_db::models::profile::{EnsureProfile, Profile};
use bilim_db::repositories::ProfileRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum length of a display name.
const MAX_DISPLAY_NAME_LEN: usize = 100;

/// Profile plus XP bar and streak milestone hints.
#[derive(Debug, Serialize)]
pub struct ProfileSummary {
    #[serde(flatten)]
    pub profile: Profile,
    pub xp: XpProgress,
    pub next_streak_milestone: Option<StreakMilestone>,
}

impl From<Profile> for ProfileSummary {
    fn from(profile: Profile) -> Self {
        Self {
            xp: XpProgress::for_points(profile.points),
            next_streak_milestone: next_streak_milestone(profile.streak),
            profile,
        }
    }
}

/// GET /api/v1/me/profile
pub async fn get_profile(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let profile = ProfileRepo::find_by_user(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Profile", user.user_id))?;
    Ok(Json(DataResponse {
        data: ProfileSummary::from(profile),
    }))
}

/// POST /api/v1/me/profile
///
/// Create the caller's profile if it does not exist yet. Counters of an
/// existing profile are never touched.
pub async fn ensure_profile(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<EnsureProfile>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.display_name {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed.chars().count() > MAX_DISPLAY_NAME_LEN {
            return Err(CoreError::Validation(format!(
                "display_name must be 1 to {MAX_DISPLAY_NAME_LEN} characters"
            ))
            .into());
        }
    }

    let profile = ProfileRepo::ensure(&state.pool, user.user_id, &input).await?;
    tracing::info!(user_id = user.user_id, "Profile ensured");

    Ok(Json(DataResponse {
        data: ProfileSummary::from(profile),
    }))
}
