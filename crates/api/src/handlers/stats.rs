//! Learner statistics.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use bilim_db::models::user_test::LearnerTotals;
use bilim_db::repositories::{AchievementRepo, UserTestRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LearnerStats {
    #[serde(flatten)]
    pub totals: LearnerTotals,
    pub achievements_unlocked: usize,
}

/// GET /api/v1/me/stats
pub async fn get_stats(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let totals = UserTestRepo::learner_totals(&state.pool, user.user_id).await?;
    let achievements_unlocked = AchievementRepo::list_for_user(&state.pool, user.user_id)
        .await?
        .len();

    Ok(Json(DataResponse {
        data: LearnerStats {
            totals,
            achievements_unlocked,
        },
    }))
}
