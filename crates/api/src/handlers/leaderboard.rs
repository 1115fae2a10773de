//! Leaderboard read path.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use bilim_core::ranking::{assign_ranks, clamp_limit, LeaderboardPeriod};
use bilim_core::types::DbId;
use bilim_db::repositories::ProfileRepo;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub period: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub user_id: DbId,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub points: i64,
    pub level: i32,
    pub streak: i32,
    pub is_current_user: bool,
}

#[derive(Debug, Serialize)]
pub struct Leaderboard {
    pub period: LeaderboardPeriod,
    pub entries: Vec<LeaderboardEntry>,
    /// The caller's rank within the same period; `null` without a profile
    /// or, for the weekly board, without recent activity.
    pub current_user_rank: Option<i64>,
}

/// GET /api/v1/leaderboard?period=all_time|weekly&limit=
pub async fn get_leaderboard(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> AppResult<impl IntoResponse> {
    let period = params
        .period
        .as_deref()
        .map(LeaderboardPeriod::from_name)
        .transpose()?
        .unwrap_or_default();
    let limit = clamp_limit(params.limit);
    let active_since = period.active_since(Utc::now().date_naive());

    let rows = ProfileRepo::leaderboard(&state.pool, active_since, limit).await?;
    let ranks = assign_ranks(&rows, |row| row.points);
    let entries: Vec<LeaderboardEntry> = rows
        .into_iter()
        .zip(ranks)
        .map(|(row, rank)| LeaderboardEntry {
            rank,
            is_current_user: row.user_id == user.user_id,
            user_id: row.user_id,
            display_name: row.display_name,
            avatar_url: row.avatar_url,
            points: row.points,
            level: row.level,
            streak: row.streak,
        })
        .collect();

    let own = ProfileRepo::find_by_user(&state.pool, user.user_id)
        .await?
        .filter(|p| match active_since {
            Some(since) => p.last_activity_date.is_some_and(|d| d >= since),
            None => true,
        });
    let current_user_rank = match own {
        Some(profile) => Some(
            1 + ProfileRepo::count_with_more_points(&state.pool, profile.points, active_since)
                .await?,
        ),
        None => None,
    };

    Ok(Json(DataResponse {
        data: Leaderboard {
            period,
            entries,
            current_user_rank,
        },
    }))
}
