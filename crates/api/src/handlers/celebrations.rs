//! Pending celebrations for the current learner.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bilim_core::error::CoreError;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/me/celebrations
///
/// Oldest first. Listing does not dismiss.
pub async fn list_celebrations(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let pending = state.celebrations.list(user.user_id).await;
    Ok(Json(DataResponse { data: pending }))
}

/// DELETE /api/v1/me/celebrations/{id}
pub async fn dismiss_celebration(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    if !state.celebrations.dismiss(user.user_id, id).await {
        return Err(CoreError::not_found("Celebration", id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/me/celebrations
///
/// Dismiss everything pending; returns how many were removed.
pub async fn dismiss_all_celebrations(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let dismissed = state.celebrations.dismiss_all(user.user_id).await;
    tracing::debug!(user_id = user.user_id, dismissed, "Celebrations dismissed");
    Ok(Json(DataResponse {
        data: serde_json::json!({ "dismissed": dismissed }),
    }))
}
