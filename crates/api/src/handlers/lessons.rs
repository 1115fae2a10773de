//! Lesson completion.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use bilim_core::error::CoreError;
use bilim_core::gamification::{validate_score, ActivityUpdate, LESSON_COMPLETION_POINTS};
use bilim_core::types::DbId;
use bilim_db::models::lesson_progress::{CompleteLesson, UserLessonProgress};
use bilim_db::repositories::{LessonProgressRepo, ProfileRepo};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::engine::ledger::{self, LedgerOutcome};
use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Study time accepted for a single completion (one day).
const MAX_TIME_SPENT_SECONDS: i32 = 86_400;

#[derive(Debug, Default, Deserialize)]
pub struct CompleteLessonRequest {
    #[serde(default)]
    pub time_spent_seconds: i32,
    pub quiz_score: Option<i32>,
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Serialize)]
pub struct LessonCompletion {
    pub progress: UserLessonProgress,
    /// `false` when the lesson had already been completed before; no
    /// completion points are awarded then.
    pub first_completion: bool,
    pub outcome: LedgerOutcome,
}

/// POST /api/v1/me/lessons/{lesson_id}/complete
///
/// Mark the lesson complete and run the ledger. Repeat completions add
/// study time and count towards the streak but earn no points.
pub async fn complete_lesson(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(lesson_id): Path<DbId>,
    Json(input): Json<CompleteLessonRequest>,
) -> AppResult<impl IntoResponse> {
    if !(0..=MAX_TIME_SPENT_SECONDS).contains(&input.time_spent_seconds) {
        return Err(CoreError::Validation(format!(
            "time_spent_seconds must be between 0 and {MAX_TIME_SPENT_SECONDS}"
        ))
        .into());
    }
    if let Some(score) = input.quiz_score {
        validate_score(score)?;
    }

    let mut tx = state.pool.begin().await?;

    ProfileRepo::lock_by_user(&mut *tx, user.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Profile", user.user_id))?;

    let already_completed = LessonProgressRepo::find(&mut *tx, user.user_id, lesson_id)
        .await?
        .is_some_and(|p| p.completed);

    let progress = LessonProgressRepo::complete(
        &mut *tx,
        user.user_id,
        lesson_id,
        &CompleteLesson {
            time_spent_seconds: input.time_spent_seconds,
            quiz_score: input.quiz_score,
        },
    )
    .await?;

    let first_completion = !already_completed;
    let update = ActivityUpdate {
        points_earned: if first_completion {
            LESSON_COMPLETION_POINTS
        } else {
            0
        },
        lesson_completed: first_completion,
        utc_offset_minutes: input.utc_offset_minutes,
        ..Default::default()
    };
    let outcome = ledger::apply_in_tx(&mut tx, user.user_id, &update, Utc::now()).await?;
    tx.commit().await?;

    ledger::publish(&state.event_bus, user.user_id, &update, &outcome);
    tracing::info!(user_id = user.user_id, lesson_id, first_completion, "Lesson completed");

    Ok(Json(DataResponse {
        data: LessonCompletion {
            progress,
            first_completion,
            outcome,
        },
    }))
}
