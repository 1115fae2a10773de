pub mod health;
pub mod leaderboard;
pub mod me;
pub mod topics;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /me/profile                                      summary (GET), ensure (POST)
/// /me/activity                                     run the ledger (POST, admin)
/// /me/lessons/{lesson_id}/complete                 lesson completion (POST)
/// /me/tests                                        list, submit
/// /me/tests/{id}                                   attempt detail
/// /me/achievements                                 achievements catalogue
/// /me/topics                                       topic progress (?subject=)
/// /me/stats                                        learner statistics
/// /me/celebrations                                 pending celebrations, dismiss all (DELETE)
/// /me/celebrations/{id}                            dismiss (DELETE)
///
/// /leaderboard                                     ?period=all_time|weekly&limit=
///
/// /topics                                          list (?subject=), create (admin only)
///
/// /mini-tests/sessions                             start (POST)
/// /mini-tests/sessions/{id}                        view, discard
/// /mini-tests/sessions/{id}/answer                 select option (POST)
/// /mini-tests/sessions/{id}/next                   advance (POST)
/// /mini-tests/sessions/{id}/restart                restart (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Everything scoped to the calling learner.
        .nest("/me", me::router())
        .nest("/leaderboard", leaderboard::router())
        // Topic catalogue; creation is admin only.
        .nest("/topics", topics::router())
        // Adaptive mini-test sessions (in memory).
        .nest("/mini-tests/sessions", mini_tests::router())
}
