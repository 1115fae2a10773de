//! Handlers for the topic catalogue and per-learner topic progress.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bilim_core::error::CoreError;
use bilim_core::mastery::{MasteryTier, NOT_ATTEMPTED};
use bilim_core::types::{DbId, Timestamp};
use bilim_db::models::topic::CreateTopic;
use bilim_db::repositories::{TopicProgressRepo, TopicRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::SubjectParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum length of a subject or title.
const MAX_NAME_LEN: usize = 200;

#[derive(Debug, Serialize)]
pub struct TopicProgressEntry {
    pub topic_id: DbId,
    pub subject: String,
    pub title: String,
    pub title_local: Option<String>,
    pub order_index: i32,
    /// Mastery tier name, or `not_attempted`.
    pub mastery: String,
    pub progress_percent: i32,
    pub last_practiced_at: Option<Timestamp>,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct TopicProgressSummary {
    pub total: usize,
    pub mastered: usize,
    pub in_progress: usize,
    pub weak: usize,
    pub not_attempted: usize,
}

#[derive(Debug, Serialize)]
pub struct TopicProgressResponse {
    pub topics: Vec<TopicProgressEntry>,
    pub summary: TopicProgressSummary,
}

/// GET /api/v1/me/topics?subject=
///
/// Every topic (optionally of one subject) in curriculum order, with the
/// caller's mastery.
pub async fn my_topic_progress(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<SubjectParams>,
) -> AppResult<impl IntoResponse> {
    let rows =
        TopicProgressRepo::list_with_topics(&state.pool, user.user_id, params.subject.as_deref())
            .await?;

    let mut summary = TopicProgressSummary {
        total: rows.len(),
        ..Default::default()
    };
    let mut topics = Vec::with_capacity(rows.len());
    for row in rows {
        let tier = row
            .mastery
            .as_deref()
            .map(MasteryTier::from_name)
            .transpose()
            .map_err(|e| CoreError::Internal(format!("Stored mastery is invalid: {e}")))?;
        match tier {
            Some(MasteryTier::Mastered) => summary.mastered += 1,
            Some(MasteryTier::InProgress) => summary.in_progress += 1,
            Some(MasteryTier::Weak) => summary.weak += 1,
            None => summary.not_attempted += 1,
        }
        topics.push(TopicProgressEntry {
            topic_id: row.topic_id,
            subject: row.subject,
            title: row.title,
            title_local: row.title_local,
            order_index: row.order_index,
            mastery: tier.map_or(NOT_ATTEMPTED, MasteryTier::as_str).to_string(),
            progress_percent: row.progress_percent.unwrap_or(0),
            last_practiced_at: row.last_practiced_at,
        });
    }

    Ok(Json(DataResponse {
        data: TopicProgressResponse { topics, summary },
    }))
}

/// GET /api/v1/topics?subject=
pub async fn list_topics(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<SubjectParams>,
) -> AppResult<impl IntoResponse> {
    let topics = TopicRepo::list(&state.pool, params.subject.as_deref()).await?;
    Ok(Json(DataResponse { data: topics }))
}

/// POST /api/v1/topics
///
/// Admin only. Duplicate subject/title pairs are rejected with 409.
pub async fn create_topic(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateTopic>,
) -> AppResult<impl IntoResponse> {
    for (field, value) in [("subject", &input.subject), ("title", &input.title)] {
        let value = value.trim();
        if value.is_empty() || value.chars().count() > MAX_NAME_LEN {
            return Err(CoreError::Validation(format!(
                "{field} must be 1 to {MAX_NAME_LEN} characters"
            ))
            .into());
        }
    }
    if input.order_index < 0 {
        return Err(CoreError::Validation("order_index must not be negative".into()).into());
    }

    let topic = TopicRepo::create(&state.pool, &input).await?;
    tracing::info!(topic_id = topic.id, user_id = admin.user_id, "Topic created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: topic })))
}
