use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use maarifahub::config::Config;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // A pooled in-memory sqlite database exists per connection.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;

    let state = maarifahub::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    maarifahub::api::router(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn authed(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Registers a user and returns their bearer token and id.
async fn signup(app: &Router, username: &str) -> (String, i32) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    json!({
                        "username": username,
                        "email": format!("{username}@example.com"),
                        "password": "secret-password",
                        "role": "member"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let token = body["token"].as_str().unwrap().to_string();
    let id = body["user"]["id"].as_i64().unwrap() as i32;
    (token, id)
}

#[tokio::test]
async fn health_and_categories_are_public() {
    let app = spawn_app().await;

    let response = app.clone().oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");

    let response = app.clone().oneshot(get("/api/categories")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 9);
    assert_eq!(body[0]["name"], "Health & Well-being");
}

#[tokio::test]
async fn post_lifecycle() {
    let app = spawn_app().await;
    let (token, author_id) = signup(&app, "amina").await;

    // Create
    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/posts",
            &token,
            json!({
                "postType": "question",
                "title": "Best maize variety for short rains?",
                "content": "Which variety matures fastest in Machakos?",
                "category": "agriculture-environment",
                "tags": ["maize", "machakos"]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let post = body_json(response).await;
    let post_id = post["id"].as_i64().unwrap();
    assert_eq!(post["authorId"].as_i64().unwrap() as i32, author_id);
    assert_eq!(post["views"], 0);
    assert_eq!(post["tags"], json!(["maize", "machakos"]));

    // Public listing
    let response = app.clone().oneshot(get("/api/posts")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["currentPage"], 1);
    assert_eq!(body["posts"].as_array().unwrap().len(), 1);

    // Reading bumps the view count
    let response = app
        .clone()
        .oneshot(get(&format!("/api/posts/{post_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response).await;
    assert_eq!(detail["views"], 1);
    assert_eq!(detail["author"]["username"], "amina");

    // Update by author
    let response = app
        .clone()
        .oneshot(authed(
            "PUT",
            &format!("/api/posts/{post_id}"),
            &token,
            json!({ "isResolved": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["isResolved"], true);

    // Update by someone else is forbidden
    let (other_token, _) = signup(&app, "baraka").await;
    let response = app
        .clone()
        .oneshot(authed(
            "PUT",
            &format!("/api/posts/{post_id}"),
            &other_token,
            json!({ "title": "hijacked" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // So is deletion
    let response = app
        .clone()
        .oneshot(authed(
            "DELETE",
            &format!("/api/posts/{post_id}"),
            &other_token,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The author can delete
    let response = app
        .clone()
        .oneshot(authed(
            "DELETE",
            &format!("/api/posts/{post_id}"),
            &token,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/posts/{post_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn vote_toggles_and_flips() {
    let app = spawn_app().await;
    let (author_token, _) = signup(&app, "amina").await;
    let (voter_token, _) = signup(&app, "baraka").await;

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/posts",
            &author_token,
            json!({
                "postType": "opinion",
                "title": "Mobile money changed everything",
                "content": "Discuss.",
                "category": "finance-business"
            }),
        ))
        .await
        .unwrap();
    let post_id = body_json(response).await["id"].as_i64().unwrap();

    let upvote_uri = format!("/api/posts/{post_id}/upvote");
    let downvote_uri = format!("/api/posts/{post_id}/downvote");

    // First upvote counts
    let response = app
        .clone()
        .oneshot(authed("POST", &upvote_uri, &voter_token, json!({})))
        .await
        .unwrap();
    let tally = body_json(response).await;
    assert_eq!(tally["upvotes"], 1);
    assert_eq!(tally["downvotes"], 0);

    // Same vote again removes it
    let response = app
        .clone()
        .oneshot(authed("POST", &upvote_uri, &voter_token, json!({})))
        .await
        .unwrap();
    let tally = body_json(response).await;
    assert_eq!(tally["upvotes"], 0);
    assert_eq!(tally["downvotes"], 0);

    // Upvote then downvote flips
    app.clone()
        .oneshot(authed("POST", &upvote_uri, &voter_token, json!({})))
        .await
        .unwrap();
    let response = app
        .clone()
        .oneshot(authed("POST", &downvote_uri, &voter_token, json!({})))
        .await
        .unwrap();
    let tally = body_json(response).await;
    assert_eq!(tally["upvotes"], 0);
    assert_eq!(tally["downvotes"], 1);
}

#[tokio::test]
async fn replies_require_auth_and_appear_in_detail() {
    let app = spawn_app().await;
    let (token, _) = signup(&app, "amina").await;

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/posts",
            &token,
            json!({
                "postType": "question",
                "title": "How to register a chama?",
                "content": "What paperwork is needed?",
                "category": "law"
            }),
        ))
        .await
        .unwrap();
    let post_id = body_json(response).await["id"].as_i64().unwrap();

    // Anonymous reply is rejected
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/posts/{post_id}/replies"))
                .header("Content-Type", "application/json")
                .body(Body::from(json!({ "content": "hello" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            &format!("/api/posts/{post_id}/replies"),
            &token,
            json!({ "content": "Visit the registrar of societies." }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/posts/{post_id}")))
        .await
        .unwrap();
    let detail = body_json(response).await;
    assert_eq!(detail["replies"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn job_posting_and_single_application() {
    let app = spawn_app().await;
    let (employer_token, _) = signup(&app, "employer").await;
    let (seeker_token, _) = signup(&app, "seeker").await;

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/jobs",
            &employer_token,
            json!({
                "title": "Community health worker",
                "company": "Afya Trust",
                "location": "Kisumu",
                "jobType": "Full-time",
                "category": "health-well-being",
                "description": "Door-to-door health education.",
                "salaryMin": 30000,
                "salaryMax": 45000
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let job = body_json(response).await;
    let job_id = job["id"].as_i64().unwrap();
    assert_eq!(job["salaryCurrency"], "KES");
    assert_eq!(job["isActive"], true);

    // Listing is public
    let response = app.clone().oneshot(get("/api/jobs")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["jobs"].as_array().unwrap().len(), 1);

    // First application succeeds
    let apply_uri = format!("/api/jobs/{job_id}/apply");
    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            &apply_uri,
            &seeker_token,
            json!({ "coverLetter": "I have 3 years of experience." }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Second one is rejected
    let response = app
        .clone()
        .oneshot(authed("POST", &apply_uri, &seeker_token, json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Bad job type is rejected
    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/jobs",
            &employer_token,
            json!({
                "title": "Another role",
                "company": "Afya Trust",
                "location": "Kisumu",
                "jobType": "gig",
                "category": "health-well-being",
                "description": "x"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn freelancer_profile_upsert_and_reviews() {
    let app = spawn_app().await;
    let (freelancer_token, _) = signup(&app, "fundi").await;
    let (client_token, _) = signup(&app, "client").await;

    // First call creates
    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/freelancers/profile",
            &freelancer_token,
            json!({
                "title": "Carpenter and joiner",
                "category": "community-development",
                "description": "Custom furniture.",
                "skills": ["carpentry"],
                "availability": "Available"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let profile = body_json(response).await;
    let freelancer_id = profile["id"].as_i64().unwrap();
    assert_eq!(profile["rating"], 0.0);

    // Second call updates
    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/freelancers/profile",
            &freelancer_token,
            json!({
                "title": "Master carpenter",
                "category": "community-development",
                "description": "Custom furniture and fittings.",
                "availability": "Busy"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["id"].as_i64().unwrap(), freelancer_id);
    assert_eq!(updated["title"], "Master carpenter");

    let reviews_uri = format!("/api/freelancers/{freelancer_id}/reviews");

    // Self-review is rejected
    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            &reviews_uri,
            &freelancer_token,
            json!({ "rating": 5 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Rating out of range
    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            &reviews_uri,
            &client_token,
            json!({ "rating": 6 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // A valid review lands and moves the average
    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            &reviews_uri,
            &client_token,
            json!({ "rating": 4, "comment": "Solid work" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Duplicate review is a conflict
    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            &reviews_uri,
            &client_token,
            json!({ "rating": 5 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/freelancers/{freelancer_id}")))
        .await
        .unwrap();
    let detail = body_json(response).await;
    assert_eq!(detail["rating"], 4.0);
    assert_eq!(detail["reviews"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn messaging_is_participant_only() {
    let app = spawn_app().await;
    let (amina_token, amina_id) = signup(&app, "amina").await;
    let (baraka_token, baraka_id) = signup(&app, "baraka").await;
    let (outsider_token, _) = signup(&app, "outsider").await;

    // Start a conversation
    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/messages/conversations",
            &amina_token,
            json!({ "recipientId": baraka_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let conversation = body_json(response).await;
    let conversation_id = conversation["id"].as_i64().unwrap();

    // The other participant starting it again gets the same one back
    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/messages/conversations",
            &baraka_token,
            json!({ "recipientId": amina_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let same = body_json(response).await;
    assert_eq!(same["id"].as_i64().unwrap(), conversation_id);

    // Send and read
    let messages_uri = format!("/api/messages/conversations/{conversation_id}");
    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            &messages_uri,
            &amina_token,
            json!({ "content": "Habari! Is the desk still available?" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(&messages_uri)
                .header("Authorization", format!("Bearer {baraka_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let messages = body_json(response).await;
    assert_eq!(messages.as_array().unwrap().len(), 1);

    // Non-participants get 403
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(&messages_uri)
                .header("Authorization", format!("Bearer {outsider_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            &messages_uri,
            &outsider_token,
            json!({ "content": "let me in" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn public_profile_hides_contact_details() {
    let app = spawn_app().await;
    let (token, _) = signup(&app, "amina").await;

    // Fill in some profile fields
    let response = app
        .clone()
        .oneshot(authed(
            "PUT",
            "/api/users/profile",
            &token,
            json!({ "bio": "Agronomist in Nakuru", "location": "Nakuru" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/api/users/amina")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let profile = body_json(response).await;
    assert_eq!(profile["bio"], "Agronomist in Nakuru");
    assert!(profile.get("email").is_none());
    assert!(profile.get("phone").is_none());

    let response = app
        .clone()
        .oneshot(get("/api/users/nobody"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bio_length_is_enforced() {
    let app = spawn_app().await;
    let (token, _) = signup(&app, "amina").await;

    let response = app
        .clone()
        .oneshot(authed(
            "PUT",
            "/api/users/profile",
            &token,
            json!({ "bio": "x".repeat(501) }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn system_status_reports_database_ready() {
    let app = spawn_app().await;
    let (token, _) = signup(&app, "amina").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/system/status")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let status = body_json(response).await;
    assert_eq!(status["databaseReady"], true);
    assert!(status["version"].is_string());
}

#[tokio::test]
async fn list_filters_and_pagination() {
    let app = spawn_app().await;
    let (token, _) = signup(&app, "amina").await;

    for i in 0..12 {
        let category = if i % 2 == 0 { "technology" } else { "law" };
        let response = app
            .clone()
            .oneshot(authed(
                "POST",
                "/api/posts",
                &token,
                json!({
                    "postType": "question",
                    "title": format!("Question number {i}"),
                    "content": "Body text",
                    "category": category
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(get("/api/posts?pageSize=5&page=2"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["total"], 12);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["currentPage"], 2);
    assert_eq!(body["posts"].as_array().unwrap().len(), 5);

    let response = app
        .clone()
        .oneshot(get("/api/posts?category=law"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["total"], 6);

    let response = app
        .clone()
        .oneshot(get("/api/posts?search=number%203"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
}
