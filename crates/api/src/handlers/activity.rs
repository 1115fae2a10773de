//! Raw activity endpoint feeding the gamification ledger.
//!
//! Learners earn points through lesson completion and test submission. This
//! endpoint takes the full ledger payload and is restricted to admins.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use bilim_core::gamification::ActivityUpdate;

use crate::engine::ledger;
use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/me/activity
pub async fn record_activity(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Json(update): Json<ActivityUpdate>,
) -> AppResult<impl IntoResponse> {
    let outcome =
        ledger::record_activity(&state.pool, &state.event_bus, user.user_id, &update).await?;
    tracing::info!(
        user_id = user.user_id,
        points_earned = update.points_earned,
        "Raw activity recorded"
    );
    Ok(Json(DataResponse { data: outcome }))
}
