use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use maarifahub::config::Config;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

async fn spawn_app() -> (Router, Arc<maarifahub::api::AppState>) {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // A pooled in-memory sqlite database exists per connection.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;

    let state = maarifahub::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    (maarifahub::api::router(state.clone()), state)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(app: &Router, username: &str, email: &str, password: &str) -> Value {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            json!({
                "username": username,
                "email": email,
                "password": password,
                "role": "member"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn register_returns_token_and_user_without_password() {
    let (app, _state) = spawn_app().await;

    let body = register(&app, "amina", "amina@example.com", "secret-password").await;

    assert!(body["token"].is_string());
    assert_eq!(body["user"]["username"], "amina");
    assert_eq!(body["user"]["email"], "amina@example.com");
    assert_eq!(body["user"]["role"], "member");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn register_rejects_invalid_input() {
    let (app, _state) = spawn_app().await;

    // Username too short
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            json!({
                "username": "ab",
                "email": "ab@example.com",
                "password": "secret-password",
                "role": "member"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Bad email
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            json!({
                "username": "okname",
                "email": "not-an-email",
                "password": "secret-password",
                "role": "member"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Short password
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            json!({
                "username": "okname",
                "email": "ok@example.com",
                "password": "short",
                "role": "member"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown role
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            json!({
                "username": "okname",
                "email": "ok@example.com",
                "password": "secret-password",
                "role": "superuser"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_email_is_conflict_regardless_of_case() {
    let (app, state) = spawn_app().await;

    register(&app, "amina", "amina@example.com", "secret-password").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            json!({
                "username": "different",
                "email": "AMINA@Example.COM",
                "password": "secret-password",
                "role": "member"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);

    // No second account was created
    assert!(
        state
            .store
            .get_user_by_username("different")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn login_works_with_email_or_username_any_case() {
    let (app, _state) = spawn_app().await;

    register(&app, "amina", "amina@example.com", "secret-password").await;

    for identifier in ["amina@example.com", "AMINA@EXAMPLE.COM", "Amina"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                json!({ "usernameOrEmail": identifier, "password": "secret-password" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "identifier {identifier}");
        let body = body_json(response).await;
        assert!(body["token"].is_string());
        assert_eq!(body["user"]["username"], "amina");
    }

    // The older field name is still accepted
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "identifier": "amina", "password": "secret-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn wrong_password_and_unknown_identifier_are_indistinguishable() {
    let (app, _state) = spawn_app().await;

    register(&app, "amina", "amina@example.com", "secret-password").await;

    let wrong_password = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "usernameOrEmail": "amina@example.com", "password": "wrong-password" }),
        ))
        .await
        .unwrap();

    let unknown_user = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "usernameOrEmail": "nobody@example.com", "password": "wrong-password" }),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    let body_a = wrong_password
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes();
    let body_b = unknown_user.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body_a, body_b);
}

#[tokio::test]
async fn lockout_after_repeated_failures_even_with_correct_password() {
    let (app, state) = spawn_app().await;

    let body = register(&app, "amina", "amina@example.com", "secret-password").await;
    let user_id = body["user"]["id"].as_i64().unwrap() as i32;

    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                json!({ "usernameOrEmail": "amina@example.com", "password": "wrong-password" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let sessions_before = state.store.count_active_sessions(user_id).await.unwrap();

    // The correct password no longer helps
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "usernameOrEmail": "amina@example.com", "password": "secret-password" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // No session was issued for the blocked attempt
    let sessions_after = state.store.count_active_sessions(user_id).await.unwrap();
    assert_eq!(sessions_before, sessions_after);

    // The blocked attempt itself was logged as one more failure
    let attempts = state
        .store
        .recent_login_attempts("amina@example.com", 10)
        .await
        .unwrap();
    assert_eq!(attempts.len(), 6);
    assert!(
        attempts
            .iter()
            .all(|a| !a.success && a.reason == "invalid_credentials")
    );
}

#[tokio::test]
async fn lockout_tracks_identifiers_independently() {
    let (app, _state) = spawn_app().await;

    register(&app, "amina", "amina@example.com", "secret-password").await;
    register(&app, "baraka", "baraka@example.com", "secret-password").await;

    for _ in 0..5 {
        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                json!({ "usernameOrEmail": "amina@example.com", "password": "wrong-password" }),
            ))
            .await
            .unwrap();
    }

    // The other account is unaffected
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "usernameOrEmail": "baraka@example.com", "password": "secret-password" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn successful_login_records_attempt_and_session() {
    let (app, state) = spawn_app().await;

    let body = register(&app, "amina", "amina@example.com", "secret-password").await;
    let user_id = body["user"]["id"].as_i64().unwrap() as i32;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "usernameOrEmail": "amina@example.com", "password": "secret-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // One session from registration, one from login
    let sessions = state.store.count_active_sessions(user_id).await.unwrap();
    assert_eq!(sessions, 2);

    let attempts = state
        .store
        .recent_login_attempts("amina@example.com", 10)
        .await
        .unwrap();
    assert_eq!(attempts.len(), 1);
    assert!(attempts[0].success);
    assert_eq!(attempts[0].reason, "success");
}

#[tokio::test]
async fn attempt_identifier_is_normalized_to_lowercase() {
    let (app, state) = spawn_app().await;

    register(&app, "amina", "amina@example.com", "secret-password").await;

    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "usernameOrEmail": "AMINA@Example.Com", "password": "wrong-password" }),
        ))
        .await
        .unwrap();

    let attempts = state
        .store
        .recent_login_attempts("amina@example.com", 10)
        .await
        .unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].identifier, "amina@example.com");
    assert_eq!(attempts[0].reason, "invalid_credentials");
}

#[tokio::test]
async fn protected_routes_require_valid_bearer_token() {
    let (app, _state) = spawn_app().await;

    // No token
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Garbage token
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header("Authorization", "Bearer not-a-real-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Real token
    let body = register(&app, "amina", "amina@example.com", "secret-password").await;
    let token = body["token"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let me = body_json(response).await;
    assert_eq!(me["username"], "amina");
}

#[tokio::test]
async fn retention_sweep_prunes_old_attempts_and_expired_sessions() {
    let (app, state) = spawn_app().await;

    let body = register(&app, "amina", "amina@example.com", "secret-password").await;
    let user_id = body["user"]["id"].as_i64().unwrap() as i32;

    // A fresh failure plus an artificially old one
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "usernameOrEmail": "amina@example.com", "password": "wrong-password" }),
        ))
        .await
        .unwrap();

    let old = (chrono::Utc::now() - chrono::Duration::days(40)).to_rfc3339();
    let cutoff = (chrono::Utc::now() - chrono::Duration::days(30)).to_rfc3339();

    use sea_orm::{ActiveModelTrait, Set};
    let stale = maarifahub::entities::login_attempts::ActiveModel {
        identifier: Set("amina@example.com".to_string()),
        ip_address: Set("unknown".to_string()),
        user_agent: Set(None),
        success: Set(false),
        reason: Set("invalid_credentials".to_string()),
        created_at: Set(old.clone()),
        ..Default::default()
    };
    stale.insert(&state.store.conn).await.unwrap();

    // An already-expired session
    state
        .store
        .create_session(user_id, "expired-token", "unknown", None, &old)
        .await
        .unwrap();

    let sweeper = maarifahub::scheduler::RetentionSweeper::new(
        state.store.clone(),
        maarifahub::config::RetentionConfig::default(),
    );
    sweeper.run_once().await.unwrap();

    let pruned_again = state.store.prune_login_attempts(&cutoff).await.unwrap();
    assert_eq!(pruned_again, 0, "sweep should have removed the stale row");

    let remaining = state
        .store
        .count_login_attempts("amina@example.com")
        .await
        .unwrap();
    assert_eq!(remaining, 1, "recent attempt survives the sweep");

    let deactivated_again = state
        .store
        .deactivate_expired_sessions(&chrono::Utc::now().to_rfc3339())
        .await
        .unwrap();
    assert_eq!(deactivated_again, 0);
}
