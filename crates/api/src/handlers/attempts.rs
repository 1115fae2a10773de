//! Handlers for test attempts: submission, history, and detail.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bilim_core::error::CoreError;
use bilim_core::gamification::{validate_utc_offset, ActivityUpdate};
use bilim_core::scoring::{score_answers, ScoredQuestion, TestScore};
use bilim_core::types::DbId;
use bilim_db::models::user_test::{CreateUserTest, UserTest};
use bilim_db::repositories::{ProfileRepo, TopicRepo, UserTestRepo};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::engine::ledger::{self, LedgerOutcome};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum length of an attempt title.
const MAX_TITLE_LEN: usize = 200;

#[derive(Debug, Deserialize)]
pub struct SubmitTestRequest {
    pub title: String,
    pub topic_id: Option<DbId>,
    pub questions: Vec<ScoredQuestion>,
    /// Selected option per question, by position; `null` for unanswered.
    #[serde(default)]
    pub answers: Vec<Option<i32>>,
    #[serde(default)]
    pub time_taken_seconds: i32,
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl SubmitTestRequest {
    fn validate(&self) -> Result<(), CoreError> {
        let title = self.title.trim();
        if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
            return Err(CoreError::Validation(format!(
                "title must be 1 to {MAX_TITLE_LEN} characters"
            )));
        }
        if self.time_taken_seconds < 0 {
            return Err(CoreError::Validation(
                "time_taken_seconds must not be negative".into(),
            ));
        }
        validate_utc_offset(self.utc_offset_minutes)
    }
}

#[derive(Debug, Serialize)]
pub struct TestSubmission {
    pub attempt: UserTest,
    pub result: TestScore,
    pub outcome: LedgerOutcome,
}

/// POST /api/v1/me/tests
///
/// Score the answers, store the attempt, and run the ledger with points
/// equal to the score percentage.
pub async fn submit_test(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<SubmitTestRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let result = score_answers(&input.questions, &input.answers)?;
    let topic_performance = serde_json::to_value(&result.topic_performance)
        .map_err(|e| AppError::InternalError(format!("Failed to encode topic performance: {e}")))?;

    let mut tx = state.pool.begin().await?;

    ProfileRepo::lock_by_user(&mut *tx, user.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Profile", user.user_id))?;

    if let Some(topic_id) = input.topic_id {
        TopicRepo::find_by_id(&mut *tx, topic_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Topic", topic_id))?;
    }

    let attempt = UserTestRepo::create(
        &mut *tx,
        user.user_id,
        &CreateUserTest {
            topic_id: input.topic_id,
            title: input.title.trim().to_string(),
            score: result.score,
            correct_count: result.correct as i32,
            total_questions: result.total as i32,
            time_taken_seconds: input.time_taken_seconds,
            topic_performance,
        },
    )
    .await?;

    let update = ActivityUpdate {
        points_earned: i64::from(result.score),
        test_score: Some(result.score),
        topic_id: input.topic_id,
        utc_offset_minutes: input.utc_offset_minutes,
        ..Default::default()
    };
    let outcome = ledger::apply_in_tx(&mut tx, user.user_id, &update, Utc::now()).await?;
    tx.commit().await?;

    ledger::publish(&state.event_bus, user.user_id, &update, &outcome);
    tracing::info!(
        user_id = user.user_id,
        attempt_id = attempt.id,
        score = result.score,
        "Test submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: TestSubmission {
                attempt,
                result,
                outcome,
            },
        }),
    ))
}

/// GET /api/v1/me/tests
///
/// The caller's attempts, newest first.
pub async fn list_tests(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = params.clamped();
    let attempts = UserTestRepo::list_for_user(&state.pool, user.user_id, limit, offset).await?;
    Ok(Json(DataResponse { data: attempts }))
}

/// GET /api/v1/me/tests/{id}
pub async fn get_test(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let attempt = UserTestRepo::find_for_user(&state.pool, user.user_id, id)
        .await?
        .ok_or_else(|| CoreError::not_found("UserTest", id))?;
    Ok(Json(DataResponse { data: attempt }))
}
