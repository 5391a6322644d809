use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{SeaOrmAuthService, TokenSigner};

pub mod auth;
mod categories;
mod error;
mod freelancers;
mod jobs;
mod messages;
mod observability;
mod posts;
mod system;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub auth: Arc<SeaOrmAuthService>,

    pub tokens: TokenSigner,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

pub fn create_app_state(
    config: Config,
    store: Store,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    let tokens = TokenSigner::new(&config.security.jwt);

    let auth = Arc::new(SeaOrmAuthService::new(
        store.clone(),
        tokens.clone(),
        config.security.clone(),
    ));

    Arc::new(AppState {
        config,
        store,
        auth,
        tokens,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    Ok(create_app_state(config, store, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/health", get(system::health))
        .route("/categories", get(categories::list_categories))
        .route("/posts", get(posts::list_posts))
        .route("/posts/{id}", get(posts::get_post))
        .route("/jobs", get(jobs::list_jobs))
        .route("/jobs/{id}", get(jobs::get_job))
        .route("/freelancers", get(freelancers::list_freelancers))
        .route("/freelancers/{id}", get(freelancers::get_freelancer))
        .route("/users/{username}", get(users::get_user))
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::get_current_user))
        .route("/users/profile", put(users::update_profile))
        .route("/posts", post(posts::create_post))
        .route("/posts/{id}", put(posts::update_post))
        .route("/posts/{id}", delete(posts::delete_post))
        .route("/posts/{id}/upvote", post(posts::upvote_post))
        .route("/posts/{id}/downvote", post(posts::downvote_post))
        .route("/posts/{id}/replies", post(posts::add_reply))
        .route("/jobs", post(jobs::create_job))
        .route("/jobs/{id}/apply", post(jobs::apply_to_job))
        .route("/freelancers/profile", post(freelancers::upsert_profile))
        .route("/freelancers/{id}/reviews", post(freelancers::add_review))
        .route(
            "/messages/conversations",
            get(messages::list_conversations),
        )
        .route(
            "/messages/conversations",
            post(messages::start_conversation),
        )
        .route(
            "/messages/conversations/{id}",
            get(messages::list_messages),
        )
        .route(
            "/messages/conversations/{id}",
            post(messages::send_message),
        )
        .route("/system/status", get(system::get_status))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
