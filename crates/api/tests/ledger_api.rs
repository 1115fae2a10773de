//! HTTP-level tests for the gamification ledger: raw activity, lesson
//! completion, test submission, and the read paths that reflect them.

mod common;

use axum::http::StatusCode;
use bilim_core::roles::{ROLE_ADMIN, ROLE_STUDENT};
use bilim_db::models::topic::CreateTopic;
use bilim_db::repositories::{AchievementRepo, ProfileRepo, TopicRepo};
use chrono::Days;
use common::{
    body_json, build_test_app, ensure_profile, get_auth, midday_offset, offset_for_local_hour,
    post_json_auth, token_for,
};
use serde_json::json;
use sqlx::PgPool;

fn algebra() -> CreateTopic {
    CreateTopic {
        subject: "math".to_string(),
        title: "Algebra".to_string(),
        title_local: None,
        order_index: 1,
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_summary_requires_a_profile(pool: PgPool) {
    let app = build_test_app(pool);
    let token = token_for(1, ROLE_STUDENT);

    let response = get_auth(app.clone(), "/api/v1/me/profile", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    ensure_profile(&app, &token).await;

    let response = get_auth(app, "/api/v1/me/profile", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["user_id"], 1);
    assert_eq!(data["display_name"], "Learner");
    assert_eq!(data["points"], 0);
    assert_eq!(data["level"], 1);
    assert_eq!(data["xp"]["points_to_next_level"], 500);
    assert_eq!(data["next_streak_milestone"]["days"], 3);
    assert_eq!(data["next_streak_milestone"]["reward_points"], 100);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ensure_profile_never_resets_counters(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let token = token_for(1, ROLE_STUDENT);
    ensure_profile(&app, &token).await;

    let (_, today) = midday_offset();
    ProfileRepo::update_counters(&pool, 1, 120, 1, 1, today)
        .await
        .unwrap();

    let response = post_json_auth(app, "/api/v1/me/profile", &token, json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["points"], 120);
    assert_eq!(json["data"]["display_name"], "Learner");
}

// ---------------------------------------------------------------------------
// Raw activity
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn activity_continues_streak_and_levels_up(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let token = token_for(1, ROLE_ADMIN);
    ensure_profile(&app, &token).await;

    let (offset, today) = midday_offset();
    let yesterday = today.checked_sub_days(Days::new(1)).unwrap();
    ProfileRepo::update_counters(&pool, 1, 450, 1, 2, yesterday)
        .await
        .unwrap();
    // Already held, so reaching a 3-day streak adds no bonus.
    AchievementRepo::insert_if_absent(&pool, 1, "streak_3", 100)
        .await
        .unwrap();

    let response = post_json_auth(
        app,
        "/api/v1/me/activity",
        &token,
        json!({ "points_earned": 60, "utc_offset_minutes": offset }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["points"], 510);
    assert_eq!(data["level"], 2);
    assert_eq!(data["previous_level"], 1);
    assert_eq!(data["streak"], 3);
    assert_eq!(data["last_activity_date"], today.to_string());
    assert_eq!(data["bonus_points"], 0);
    assert!(data["new_achievements"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn streak_achievement_bonus_is_awarded_once(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let token = token_for(1, ROLE_ADMIN);
    ensure_profile(&app, &token).await;

    let (offset, today) = midday_offset();
    let yesterday = today.checked_sub_days(Days::new(1)).unwrap();
    ProfileRepo::update_counters(&pool, 1, 0, 1, 2, yesterday)
        .await
        .unwrap();

    let body = json!({ "points_earned": 10, "utc_offset_minutes": offset });
    let first = body_json(post_json_auth(app.clone(), "/api/v1/me/activity", &token, body.clone()).await).await;
    assert_eq!(first["data"]["streak"], 3);
    assert_eq!(first["data"]["new_achievements"][0]["kind"], "streak_3");
    assert_eq!(first["data"]["points"], 110);

    let second = body_json(post_json_auth(app, "/api/v1/me/activity", &token, body).await).await;
    assert_eq!(second["data"]["streak"], 3);
    assert!(second["data"]["new_achievements"].as_array().unwrap().is_empty());
    assert_eq!(second["data"]["points"], 120);

    let held = AchievementRepo::list_for_user(&pool, 1).await.unwrap();
    assert_eq!(held.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn students_cannot_post_raw_activity(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let token = token_for(7, ROLE_STUDENT);
    ensure_profile(&app, &token).await;

    let response = post_json_auth(
        app,
        "/api/v1/me/activity",
        &token,
        json!({ "points_earned": 10_000, "test_score": 90, "topic_id": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");

    let profile = ProfileRepo::find_by_user(&pool, 7).await.unwrap().unwrap();
    assert_eq!(profile.points, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn activity_without_profile_is_404(pool: PgPool) {
    let app = build_test_app(pool);
    let token = token_for(7, ROLE_ADMIN);

    let response =
        post_json_auth(app, "/api/v1/me/activity", &token, json!({ "points_earned": 10 })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn activity_rejects_out_of_range_input(pool: PgPool) {
    let app = build_test_app(pool);
    let token = token_for(1, ROLE_ADMIN);
    ensure_profile(&app, &token).await;

    for body in [
        json!({ "points_earned": -5 }),
        json!({ "points_earned": 10, "test_score": 101 }),
        json!({ "points_earned": 10, "utc_offset_minutes": 15 * 60 }),
    ] {
        let response = post_json_auth(app.clone(), "/api/v1/me/activity", &token, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn activity_with_unknown_topic_rolls_back(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let token = token_for(1, ROLE_ADMIN);
    ensure_profile(&app, &token).await;

    let response = post_json_auth(
        app,
        "/api/v1/me/activity",
        &token,
        json!({ "points_earned": 80, "test_score": 80, "topic_id": 999_999 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let profile = ProfileRepo::find_by_user(&pool, 1).await.unwrap().unwrap();
    assert_eq!(profile.points, 0);
    assert!(profile.last_activity_date.is_none());
}

// ---------------------------------------------------------------------------
// Lesson completion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn lesson_completion_awards_points_once(pool: PgPool) {
    let app = build_test_app(pool);
    let token = token_for(1, ROLE_STUDENT);
    ensure_profile(&app, &token).await;
    let (offset, _) = midday_offset();

    let first = post_json_auth(
        app.clone(),
        "/api/v1/me/lessons/42/complete",
        &token,
        json!({ "time_spent_seconds": 30, "quiz_score": 90, "utc_offset_minutes": offset }),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);
    let first = body_json(first).await;
    assert_eq!(first["data"]["first_completion"], true);
    assert_eq!(first["data"]["progress"]["completed"], true);
    assert_eq!(first["data"]["progress"]["progress_percent"], 100);
    assert_eq!(first["data"]["outcome"]["points_earned"], 50);
    assert_eq!(first["data"]["outcome"]["new_achievements"][0]["kind"], "first_lesson");
    // 50 for the lesson plus 50 for the first-lesson achievement.
    assert_eq!(first["data"]["outcome"]["points"], 100);

    let second = post_json_auth(
        app.clone(),
        "/api/v1/me/lessons/42/complete",
        &token,
        json!({ "time_spent_seconds": 45, "utc_offset_minutes": offset }),
    )
    .await;
    let second = body_json(second).await;
    assert_eq!(second["data"]["first_completion"], false);
    assert_eq!(second["data"]["progress"]["time_spent_seconds"], 75);
    assert_eq!(second["data"]["progress"]["quiz_score"], 90);
    assert_eq!(second["data"]["outcome"]["points_earned"], 0);
    assert_eq!(second["data"]["outcome"]["points"], 100);
    assert!(second["data"]["outcome"]["new_achievements"]
        .as_array()
        .unwrap()
        .is_empty());

    let catalogue = body_json(get_auth(app.clone(), "/api/v1/me/achievements", &token).await).await;
    let entries = catalogue["data"].as_array().unwrap();
    assert_eq!(entries.len(), 10);
    let first_lesson = entries.iter().find(|e| e["kind"] == "first_lesson").unwrap();
    assert_eq!(first_lesson["unlocked"], true);
    assert!(first_lesson["unlocked_at"].is_string());
    let streak_3 = entries.iter().find(|e| e["kind"] == "streak_3").unwrap();
    assert_eq!(streak_3["unlocked"], false);
    assert_eq!(streak_3["progress_percent"], 33);
    let perfect = entries.iter().find(|e| e["kind"] == "perfect_score").unwrap();
    assert!(perfect["progress_percent"].is_null());

    let stats = body_json(get_auth(app, "/api/v1/me/stats", &token).await).await;
    assert_eq!(stats["data"]["lessons_completed"], 1);
    assert_eq!(stats["data"]["study_time_seconds"], 75);
    assert_eq!(stats["data"]["achievements_unlocked"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn lesson_completion_validates_input(pool: PgPool) {
    let app = build_test_app(pool);
    let token = token_for(1, ROLE_STUDENT);
    ensure_profile(&app, &token).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/me/lessons/1/complete",
        &token,
        json!({ "time_spent_seconds": -1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app,
        "/api/v1/me/lessons/1/complete",
        &token,
        json!({ "quiz_score": 120 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn lesson_time_is_capped_per_completion(pool: PgPool) {
    let app = build_test_app(pool);
    let token = token_for(1, ROLE_STUDENT);
    ensure_profile(&app, &token).await;
    let (offset, _) = midday_offset();

    let response = post_json_auth(
        app.clone(),
        "/api/v1/me/lessons/1/complete",
        &token,
        json!({ "time_spent_seconds": 2_000_000_000, "utc_offset_minutes": offset }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let full_day = json!({ "time_spent_seconds": 86_400, "utc_offset_minutes": offset });
    for _ in 0..2 {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/me/lessons/1/complete",
            &token,
            full_day.clone(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let stats = body_json(get_auth(app, "/api/v1/me/stats", &token).await).await;
    assert_eq!(stats["data"]["study_time_seconds"], 172_800);
}

// ---------------------------------------------------------------------------
// Test submission
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn perfect_test_updates_mastery_and_history(pool: PgPool) {
    let topic = TopicRepo::create(&pool, &algebra()).await.unwrap();
    let app = build_test_app(pool);
    let token = token_for(1, ROLE_STUDENT);
    ensure_profile(&app, &token).await;
    let (offset, _) = midday_offset();

    let questions: Vec<_> = (0..4)
        .map(|i| json!({ "correct_option": i % 2, "topic_id": topic.id }))
        .collect();
    let response = post_json_auth(
        app.clone(),
        "/api/v1/me/tests",
        &token,
        json!({
            "title": "Algebra check",
            "topic_id": topic.id,
            "questions": questions,
            "answers": [0, 1, 0, 1],
            "time_taken_seconds": 120,
            "utc_offset_minutes": offset,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["result"]["score"], 100);
    assert_eq!(data["result"]["correct"], 4);
    let topic_key = topic.id.to_string();
    assert_eq!(data["result"]["topic_performance"][&topic_key]["total"], 4);
    assert_eq!(data["attempt"]["score"], 100);
    assert_eq!(data["outcome"]["points_earned"], 100);
    assert_eq!(data["outcome"]["mastery"]["mastery"], "mastered");
    let kinds: Vec<_> = data["outcome"]["new_achievements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["kind"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(kinds, vec!["first_test", "perfect_score"]);
    // 100 for the score, 50 + 100 in achievement bonuses.
    assert_eq!(data["outcome"]["points"], 250);
    let attempt_id = data["attempt"]["id"].as_i64().unwrap();

    let list = body_json(get_auth(app.clone(), "/api/v1/me/tests", &token).await).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);

    let detail = get_auth(app.clone(), &format!("/api/v1/me/tests/{attempt_id}"), &token).await;
    assert_eq!(detail.status(), StatusCode::OK);

    let other = token_for(2, ROLE_STUDENT);
    let foreign = get_auth(app.clone(), &format!("/api/v1/me/tests/{attempt_id}"), &other).await;
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);

    let topics = body_json(get_auth(app.clone(), "/api/v1/me/topics?subject=math", &token).await).await;
    assert_eq!(topics["data"]["topics"][0]["mastery"], "mastered");
    assert_eq!(topics["data"]["topics"][0]["progress_percent"], 100);
    assert_eq!(topics["data"]["summary"]["mastered"], 1);
    assert_eq!(topics["data"]["summary"]["not_attempted"], 0);

    let stats = body_json(get_auth(app, "/api/v1/me/stats", &token).await).await;
    assert_eq!(stats["data"]["tests_completed"], 1);
    assert_eq!(stats["data"]["average_score"], 100);
    assert_eq!(stats["data"]["study_time_seconds"], 120);
    assert_eq!(stats["data"]["achievements_unlocked"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submission_with_unknown_topic_stores_nothing(pool: PgPool) {
    let app = build_test_app(pool);
    let token = token_for(1, ROLE_STUDENT);
    ensure_profile(&app, &token).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/me/tests",
        &token,
        json!({
            "title": "Ghost topic",
            "topic_id": 424_242,
            "questions": [{ "correct_option": 0 }],
            "answers": [0],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let list = body_json(get_auth(app, "/api/v1/me/tests", &token).await).await;
    assert!(list["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submission_rejects_malformed_attempts(pool: PgPool) {
    let app = build_test_app(pool);
    let token = token_for(1, ROLE_STUDENT);
    ensure_profile(&app, &token).await;

    for body in [
        json!({ "title": "Empty", "questions": [], "answers": [] }),
        json!({ "title": "Too many answers", "questions": [{ "correct_option": 0 }], "answers": [0, 1] }),
        json!({ "title": "  ", "questions": [{ "correct_option": 0 }], "answers": [0] }),
    ] {
        let response = post_json_auth(app.clone(), "/api/v1/me/tests", &token, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn topic_progress_lists_unattempted_topics(pool: PgPool) {
    TopicRepo::create(&pool, &algebra()).await.unwrap();
    let app = build_test_app(pool);
    let token = token_for(1, ROLE_STUDENT);

    let json = body_json(get_auth(app, "/api/v1/me/topics", &token).await).await;
    assert_eq!(json["data"]["topics"][0]["mastery"], "not_attempted");
    assert_eq!(json["data"]["topics"][0]["progress_percent"], 0);
    assert_eq!(json["data"]["summary"]["total"], 1);
    assert_eq!(json["data"]["summary"]["not_attempted"], 1);
}

// ---------------------------------------------------------------------------
// Achievements unlocked inside the ledger transaction
// ---------------------------------------------------------------------------

fn achievement_kinds(outcome: &serde_json::Value) -> Vec<String> {
    outcome["new_achievements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["kind"].as_str().unwrap().to_string())
        .collect()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn mastering_topics_unlocks_mastery_achievements_once(pool: PgPool) {
    let mut topic_ids = Vec::new();
    for i in 0..10 {
        let topic = TopicRepo::create(
            &pool,
            &CreateTopic {
                subject: "math".to_string(),
                title: format!("Topic {i}"),
                title_local: None,
                order_index: i,
            },
        )
        .await
        .unwrap();
        topic_ids.push(topic.id);
    }

    let app = build_test_app(pool.clone());
    let token = token_for(1, ROLE_STUDENT);
    ensure_profile(&app, &token).await;
    let (offset, _) = midday_offset();

    let mut last_points = 0;
    for (i, topic_id) in topic_ids.iter().enumerate() {
        // Four of five correct: 80%, just enough to master the topic.
        let questions: Vec<_> = (0..5)
            .map(|_| json!({ "correct_option": 1, "topic_id": topic_id }))
            .collect();
        let response = post_json_auth(
            app.clone(),
            "/api/v1/me/tests",
            &token,
            json!({
                "title": format!("Check {i}"),
                "topic_id": topic_id,
                "questions": questions,
                "answers": [1, 1, 1, 1, 0],
                "utc_offset_minutes": offset,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        let outcome = &json["data"]["outcome"];
        assert_eq!(outcome["mastery"]["mastery"], "mastered");

        let expected: Vec<&str> = match i {
            0 => vec!["first_test"],
            4 => vec!["mastery_5"],
            9 => vec!["mastery_10"],
            _ => vec![],
        };
        assert_eq!(achievement_kinds(outcome), expected, "submission {i}");
        if i == 4 {
            assert_eq!(outcome["bonus_points"], 150);
        }
        last_points = outcome["points"].as_i64().unwrap();
    }

    // Ten tests at 80, plus first_test, mastery_5 and mastery_10 bonuses.
    assert_eq!(last_points, 10 * 80 + 50 + 150 + 300);

    let held = AchievementRepo::list_for_user(&pool, 1).await.unwrap();
    let mastery_5 = held.iter().filter(|a| a.achievement == "mastery_5").count();
    assert_eq!(mastery_5, 1);
    assert_eq!(held.len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn local_hour_unlocks_time_of_day_achievements(pool: PgPool) {
    let app = build_test_app(pool);

    let early = token_for(1, ROLE_STUDENT);
    ensure_profile(&app, &early).await;
    let (morning, _) = offset_for_local_hour(6);
    let response = post_json_auth(
        app.clone(),
        "/api/v1/me/lessons/1/complete",
        &early,
        json!({ "utc_offset_minutes": morning }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let outcome = &json["data"]["outcome"];
    assert_eq!(achievement_kinds(outcome), vec!["first_lesson", "early_bird"]);
    // 50 for the lesson, 50 for first_lesson, 25 for early_bird.
    assert_eq!(outcome["points"], 125);

    // Held achievements are not awarded again.
    let json = body_json(
        post_json_auth(
            app.clone(),
            "/api/v1/me/lessons/2/complete",
            &early,
            json!({ "utc_offset_minutes": morning }),
        )
        .await,
    )
    .await;
    assert!(achievement_kinds(&json["data"]["outcome"]).is_empty());
    assert_eq!(json["data"]["outcome"]["points"], 175);

    let late = token_for(2, ROLE_STUDENT);
    ensure_profile(&app, &late).await;
    let (night, _) = offset_for_local_hour(23);
    let json = body_json(
        post_json_auth(
            app,
            "/api/v1/me/lessons/1/complete",
            &late,
            json!({ "utc_offset_minutes": night }),
        )
        .await,
    )
    .await;
    assert_eq!(
        achievement_kinds(&json["data"]["outcome"]),
        vec!["first_lesson", "night_owl"]
    );
}
