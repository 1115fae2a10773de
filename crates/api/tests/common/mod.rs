#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use bilim_core::types::DbId;
use chrono::{NaiveDate, Timelike, Utc};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use bilim_api::auth::jwt::{generate_access_token, JwtConfig};
use bilim_api::config::ServerConfig;
use bilim_api::mini_tests::MiniTestManager;
use bilim_api::routes;
use bilim_api::state::AppState;
use bilim_events::{CelebrationQueue, EventBus};

const TEST_JWT_SECRET: &str = "test-secret-for-integration-tests-only";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Application state with the celebration subscriber running, as in `main.rs`.
pub fn test_state(pool: PgPool) -> AppState {
    let event_bus = Arc::new(EventBus::default());
    let celebrations = Arc::new(CelebrationQueue::new());
    tokio::spawn({
        let celebrations = Arc::clone(&celebrations);
        let receiver = event_bus.subscribe();
        async move { celebrations.run(receiver).await }
    });

    AppState {
        pool,
        config: Arc::new(test_config()),
        event_bus,
        celebrations,
        mini_tests: Arc::new(MiniTestManager::new()),
    }
}

/// Build the full application router with all middleware layers.
///
/// Mirrors the router construction in `main.rs` so integration tests
/// exercise the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    build_router(test_state(pool))
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// Mint a valid access token for `user_id` with `role`.
pub fn token_for(user_id: DbId, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt).unwrap()
}

/// A whole-hour UTC offset that puts the learner at `hour` local time right
/// now, with the learner's local date. The offset stays within -12h..=+11h.
pub fn offset_for_local_hour(hour: u32) -> (i32, NaiveDate) {
    let now = Utc::now();
    let hours = (hour as i32 - now.hour() as i32 + 36) % 24 - 12;
    let offset_minutes = hours * 60;
    let local_today = (now + chrono::Duration::minutes(i64::from(offset_minutes))).date_naive();
    (offset_minutes, local_today)
}

/// Local midday; keeps time-of-day achievements out of the way.
pub fn midday_offset() -> (i32, NaiveDate) {
    offset_for_local_hour(12)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Ensure a profile exists for `user_id` through the API.
pub async fn ensure_profile(app: &Router, token: &str) {
    let response = post_json_auth(
        app.clone(),
        "/api/v1/me/profile",
        token,
        serde_json::json!({ "display_name": "Learner" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}
