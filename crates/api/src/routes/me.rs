//! Routes scoped to the authenticated learner, mounted at `/me`.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{
    achievements, activity, attempts, celebrations, lessons, profile, stats, topics,
};
use crate::state::AppState;

/// ```text
/// GET    /profile                      -> get_profile
/// POST   /profile                      -> ensure_profile
/// POST   /activity                     -> record_activity (admin)
/// POST   /lessons/{lesson_id}/complete -> complete_lesson
/// GET    /tests                        -> list_tests
/// POST   /tests                        -> submit_test
/// GET    /tests/{id}                   -> get_test
/// GET    /achievements                 -> list_achievements
/// GET    /topics                       -> my_topic_progress
/// GET    /stats                        -> get_stats
/// GET    /celebrations                 -> list_celebrations
/// DELETE /celebrations                 -> dismiss_all_celebrations
/// DELETE /celebrations/{id}            -> dismiss_celebration
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(profile::get_profile).post(profile::ensure_profile),
        )
        .route("/activity", post(activity::record_activity))
        .route(
            "/lessons/{lesson_id}/complete",
            post(lessons::complete_lesson),
        )
        .route(
            "/tests",
            get(attempts::list_tests).post(attempts::submit_test),
        )
        .route("/tests/{id}", get(attempts::get_test))
        .route("/achievements", get(achievements::list_achievements))
        .route("/topics", get(topics::my_topic_progress))
        .route("/stats", get(stats::get_stats))
        .route(
            "/celebrations",
            get(celebrations::list_celebrations).delete(celebrations::dismiss_all_celebrations),
        )
        .route(
            "/celebrations/{id}",
            delete(celebrations::dismiss_celebration),
        )
}
